//! Schema bootstrap for the dictionary tables
//!
//! `init_schema` is destructive: it drops the three tables (and with them
//! the link index) before creating them again. It is only ever run when the
//! configuration asks for it.

use rusqlite::Connection;

use crate::config::TableNames;
use crate::dialect::Dialect;
use crate::{Error, Result};

/// Ordered DDL statements that rebuild the schema for a dialect
pub fn schema_statements(tables: &TableNames, dialect: Dialect) -> Vec<String> {
    let pk = dialect.primary_key();
    let description = dialect.description_column();

    vec![
        format!("DROP TABLE IF EXISTS {}", tables.dictionaries),
        format!(
            r#"CREATE TABLE {} (
    id {pk},
    title VARCHAR(255) NOT NULL,
    author VARCHAR(255) NOT NULL DEFAULT '',
    website VARCHAR(255) NOT NULL DEFAULT '',
    description {description}
)"#,
            tables.dictionaries
        ),
        format!("DROP TABLE IF EXISTS {}", tables.words),
        format!(
            r#"CREATE TABLE {} (
    id {pk},
    word VARCHAR(255) NOT NULL UNIQUE
)"#,
            tables.words
        ),
        format!("DROP TABLE IF EXISTS {}", tables.dictionary_words),
        format!(
            r#"CREATE TABLE {} (
    dict_id INT UNSIGNED NOT NULL,
    word_id INT UNSIGNED NOT NULL,
    data TEXT
)"#,
            tables.dictionary_words
        ),
        format!(
            "CREATE UNIQUE INDEX {} ON {}(dict_id, word_id)",
            tables.link_index(),
            tables.dictionary_words
        ),
    ]
}

/// Drop and recreate the dictionary, word and link tables
pub fn init_schema(conn: &Connection, tables: &TableNames, dialect: Dialect) -> Result<()> {
    log::debug!("Rebuilding schema for {:?} dialect", dialect);

    for sql in schema_statements(tables, dialect) {
        conn.execute_batch(&sql).map_err(Error::schema)?;
    }
    Ok(())
}
