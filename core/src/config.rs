//! Converter configuration
//!
//! Options recognized by the import engine. The JSON form uses camelCase
//! keys, e.g. `{"initSchema": true, "tableWords": "headwords"}`; any key left
//! out takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Options controlling one import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    /// Drop and recreate all tables before importing. Destroys existing data.
    pub init_schema: bool,
    /// Table holding one row per imported dictionary
    pub table_dictionaries: String,
    /// Table holding unique headwords
    pub table_words: String,
    /// Link table between dictionaries and words
    pub table_dictionary_words: String,
    /// Wrap the whole run in one transaction
    pub transaction: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            init_schema: false,
            table_dictionaries: "dicts".to_string(),
            table_words: "words".to_string(),
            table_dictionary_words: "dict_words".to_string(),
            transaction: true,
        }
    }
}

impl ConverterConfig {
    /// Parse a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Table names after validation
    ///
    /// Names are interpolated into SQL text, so only plain identifiers
    /// are accepted.
    pub fn tables(&self) -> Result<TableNames> {
        let tables = TableNames {
            dictionaries: self.table_dictionaries.clone(),
            words: self.table_words.clone(),
            dictionary_words: self.table_dictionary_words.clone(),
        };
        tables.validate()?;
        Ok(tables)
    }
}

/// Resolved table names for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub dictionaries: String,
    pub words: String,
    pub dictionary_words: String,
}

impl Default for TableNames {
    fn default() -> Self {
        let config = ConverterConfig::default();
        Self {
            dictionaries: config.table_dictionaries,
            words: config.table_words,
            dictionary_words: config.table_dictionary_words,
        }
    }
}

impl TableNames {
    /// Name of the unique (dictionary, word) index on the link table
    pub fn link_index(&self) -> String {
        format!("idx_{}", self.dictionary_words)
    }

    fn validate(&self) -> Result<()> {
        for name in [&self.dictionaries, &self.words, &self.dictionary_words] {
            if !is_identifier(name) {
                return Err(Error::Config(format!("invalid table name: {:?}", name)));
            }
        }
        if self.dictionaries == self.words
            || self.words == self.dictionary_words
            || self.dictionaries == self.dictionary_words
        {
            return Err(Error::Config("table names must be distinct".to_string()));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
