//! # dictdb-core
//!
//! Import engine that converts a stream of dictionary entries into a
//! normalized SQL store.
//!
//! This crate provides:
//! - Dialect detection for the backing store and schema bootstrap
//! - Registration of the imported dictionary
//! - Cached statements for word lookup, word insertion and link insertion
//! - A transactional import lifecycle with rollback on failure
//!
//! Every headword is stored once per database, no matter how many
//! dictionaries reference it. Each entry becomes one row in the link table
//! carrying that dictionary's payload for the word.
//!
//! ## Usage
//!
//! ```ignore
//! use dictdb_core::{convert, ConverterConfig, DictionaryInfo, Entry, SqliteConverter};
//!
//! let conn = dictdb_core::db::open_database("/path/to/dict.db")?;
//! let config = ConverterConfig { init_schema: true, ..Default::default() };
//! let mut converter = SqliteConverter::new(config).with_connection(&conn);
//!
//! let info = DictionaryInfo::new("My Dictionary").with_author("Me");
//! let entries = vec![Ok(Entry::new("alpha", "first letter"))];
//! let stats = convert(&mut converter, &info, entries, |_| {})?;
//! println!("{} links added", stats.links_added);
//! ```

pub mod config;
pub mod converter;
pub mod db;
pub mod dialect;
pub mod models;
pub mod schema;
pub mod statements;

use std::fmt;

use thiserror::Error;

pub use config::{ConverterConfig, TableNames};
pub use converter::{convert, AbortOutcome, Converter, ImportStats, RunState, SqliteConverter};
pub use dialect::{Dialect, StoreInfo};
pub use models::{Dictionary, DictionaryInfo, DictionaryWord, Entry, Word};
pub use rusqlite::Connection;

/// Errors that can occur in dictdb-core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store not initialized")]
    StoreNotReady,

    #[error("Converter not initialized")]
    NotInitialized,

    #[error("Converter is not running (state: {0:?})")]
    InvalidState(RunState),

    #[error("Schema error: {0}")]
    Schema(NativeError),

    #[error("Transaction error: {0}")]
    Transaction(NativeError),

    #[error("Statement error: {0}")]
    Statement(NativeError),

    #[error("Dictionary registration error: {0}")]
    Registration(NativeError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn schema(err: rusqlite::Error) -> Self {
        Error::Schema(err.into())
    }

    pub(crate) fn transaction(err: rusqlite::Error) -> Self {
        Error::Transaction(err.into())
    }

    pub(crate) fn statement(err: rusqlite::Error) -> Self {
        Error::Statement(err.into())
    }

    pub(crate) fn registration(err: rusqlite::Error) -> Self {
        Error::Registration(err.into())
    }

    /// The store diagnostic carried by this error, if any
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            Error::Schema(n)
            | Error::Transaction(n)
            | Error::Statement(n)
            | Error::Registration(n) => Some(n),
            _ => None,
        }
    }

    /// Whether the store rejected the operation because of a constraint
    ///
    /// A duplicate (dictionary, word) pair in the source surfaces this way.
    pub fn is_constraint_violation(&self) -> bool {
        self.native()
            .map(|n| n.state == NativeError::STATE_CONSTRAINT)
            .unwrap_or(false)
    }
}

/// Native diagnostic reported by the store
///
/// Mirrors the (state code, error code, message) triple that SQL drivers
/// expose on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// SQLSTATE-style class code
    pub state: String,
    /// Driver specific error code (sqlite extended result code)
    pub code: Option<i32>,
    /// Human readable message from the store
    pub message: String,
}

impl NativeError {
    /// Integrity constraint violation
    pub const STATE_CONSTRAINT: &'static str = "23000";
    /// General error
    pub const STATE_GENERAL: &'static str = "HY000";
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code.map(|c| c.to_string()).unwrap_or_default();
        write!(
            f,
            "SQLSTATE: \"{}\", Error code: \"{}\", Message: \"{}\"",
            self.state, code, self.message
        )
    }
}

impl From<rusqlite::Error> for NativeError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ffi_err, message) => {
                let state = if ffi_err.code == rusqlite::ErrorCode::ConstraintViolation {
                    NativeError::STATE_CONSTRAINT
                } else {
                    NativeError::STATE_GENERAL
                };
                NativeError {
                    state: state.to_string(),
                    code: Some(ffi_err.extended_code),
                    message: message.unwrap_or_else(|| ffi_err.to_string()),
                }
            }
            other => NativeError {
                state: NativeError::STATE_GENERAL.to_string(),
                code: None,
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for dictdb-core operations
pub type Result<T> = std::result::Result<T, Error>;
