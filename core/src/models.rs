//! Data models for dictionaries, words and links
//!
//! `DictionaryInfo` and `Entry` are what a dictionary source hands to the
//! engine. `Dictionary`, `Word` and `DictionaryWord` are rows read back from
//! the store.

use serde::{Deserialize, Serialize};

/// Descriptive metadata of the dictionary being imported
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryInfo {
    /// Dictionary title (required)
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DictionaryInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One (headword, payload) pair yielded by a dictionary source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub word: String,
    /// Opaque entry content, stored as-is
    pub data: String,
}

impl Entry {
    pub fn new(word: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            data: data.into(),
        }
    }
}

/// A registered dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    /// Store-assigned identifier
    pub id: i64,
    pub title: String,
    pub author: String,
    pub website: String,
    pub description: String,
}

/// A unique headword shared by all dictionaries in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Store-assigned identifier
    pub id: i64,
    /// The headword text
    pub word: String,
}

/// Association of one word with one dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryWord {
    pub dictionary_id: i64,
    pub word_id: i64,
    /// The dictionary's payload for this word
    pub data: Option<String>,
}
