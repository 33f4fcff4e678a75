//! Prepared statements reused for every entry of a run
//!
//! The three statements are prepared once in `init` and borrowed from the
//! connection for the lifetime of the run. Dropping `Statements` finalizes
//! them, which must happen before the transaction is committed or rolled
//! back.

use rusqlite::{params, Connection, OptionalExtension, Statement};

use crate::config::TableNames;
use crate::{Error, Result};

/// Cached word lookup, word insertion and link insertion
pub struct Statements<'conn> {
    check_word: Statement<'conn>,
    add_word: Statement<'conn>,
    add_link: Statement<'conn>,
}

impl<'conn> Statements<'conn> {
    /// Prepare all three statements against the given tables
    pub fn prepare(conn: &'conn Connection, tables: &TableNames) -> Result<Self> {
        let check_word = conn
            .prepare(&format!("SELECT id FROM {} WHERE word = ?", tables.words))
            .map_err(Error::statement)?;
        let add_word = conn
            .prepare(&format!("INSERT INTO {} (word) VALUES (?)", tables.words))
            .map_err(Error::statement)?;
        let add_link = conn
            .prepare(&format!(
                "INSERT INTO {} (dict_id, word_id, data) VALUES (?, ?, ?)",
                tables.dictionary_words
            ))
            .map_err(Error::statement)?;

        Ok(Self {
            check_word,
            add_word,
            add_link,
        })
    }

    /// ID of an existing word, if any
    pub fn check_word(&mut self, word: &str) -> Result<Option<i64>> {
        self.check_word
            .query_row(params![word], |row| row.get(0))
            .optional()
            .map_err(Error::statement)
    }

    /// Insert a new word and return its store-assigned ID
    pub fn add_word(&mut self, word: &str) -> Result<i64> {
        self.add_word
            .insert(params![word])
            .map_err(Error::statement)
    }

    /// Link a word to a dictionary with the entry payload
    pub fn add_link(&mut self, dictionary_id: i64, word_id: i64, data: &str) -> Result<()> {
        self.add_link
            .execute(params![dictionary_id, word_id, data])
            .map_err(Error::statement)?;
        Ok(())
    }
}
