//! SQLite database operations
//!
//! This module handles the store-level pieces around an import:
//! - Opening and configuring a database for bulk writes
//! - Registering the dictionary being imported
//! - Read-back queries over the dictionary, word and link tables

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::config::TableNames;
use crate::models::{Dictionary, DictionaryInfo, DictionaryWord, Word};
use crate::{Error, Result};

/// Open a database for importing, creating it if necessary
pub fn open_database(db_path: &str) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    configure_for_import(&conn)?;
    Ok(conn)
}

/// Configure SQLite connection for fast bulk imports
fn configure_for_import(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -64000;  -- 64MB cache
        PRAGMA temp_store = MEMORY;
        "#,
    )?;
    Ok(())
}

/// Insert a dictionary row and return its store-assigned ID
///
/// Missing author, website and description are stored as empty strings.
pub fn insert_dictionary(conn: &Connection, table: &str, info: &DictionaryInfo) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {} (title, author, website, description) VALUES (?, ?, ?, ?)",
        table
    );
    let mut stmt = conn.prepare(&sql).map_err(Error::registration)?;

    stmt.insert(params![
        info.title,
        info.author.as_deref().unwrap_or(""),
        info.website.as_deref().unwrap_or(""),
        info.description.as_deref().unwrap_or(""),
    ])
    .map_err(Error::registration)
}

/// Count the rows of a table
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

/// Count the links of one dictionary
pub fn count_links(conn: &Connection, tables: &TableNames, dictionary_id: i64) -> Result<i64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE dict_id = ?", tables.dictionary_words),
        params![dictionary_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Get a dictionary by ID
pub fn get_dictionary(
    conn: &Connection,
    tables: &TableNames,
    dictionary_id: i64,
) -> Result<Option<Dictionary>> {
    let sql = format!(
        "SELECT id, title, author, website, COALESCE(description, '') FROM {} WHERE id = ?",
        tables.dictionaries
    );
    conn.query_row(&sql, params![dictionary_id], row_to_dictionary)
        .optional()
        .map_err(Into::into)
}

/// List all registered dictionaries in registration order
pub fn list_dictionaries(conn: &Connection, tables: &TableNames) -> Result<Vec<Dictionary>> {
    let sql = format!(
        "SELECT id, title, author, website, COALESCE(description, '') FROM {} ORDER BY id",
        tables.dictionaries
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_dictionary)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| e.into())
}

fn row_to_dictionary(row: &rusqlite::Row<'_>) -> rusqlite::Result<Dictionary> {
    Ok(Dictionary {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        website: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Look up the ID of a headword
pub fn find_word_id(conn: &Connection, tables: &TableNames, word: &str) -> Result<Option<i64>> {
    let sql = format!("SELECT id FROM {} WHERE word = ?", tables.words);
    conn.query_row(&sql, params![word], |row| row.get(0))
        .optional()
        .map_err(Into::into)
}

/// Get a word by ID
pub fn get_word(conn: &Connection, tables: &TableNames, word_id: i64) -> Result<Option<Word>> {
    let sql = format!("SELECT id, word FROM {} WHERE id = ?", tables.words);
    conn.query_row(&sql, params![word_id], |row| {
        Ok(Word {
            id: row.get(0)?,
            word: row.get(1)?,
        })
    })
    .optional()
    .map_err(Into::into)
}

/// Get all links of a dictionary in insertion order
pub fn get_dictionary_words(
    conn: &Connection,
    tables: &TableNames,
    dictionary_id: i64,
) -> Result<Vec<DictionaryWord>> {
    let sql = format!(
        "SELECT dict_id, word_id, data FROM {} WHERE dict_id = ? ORDER BY rowid",
        tables.dictionary_words
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt.query_map(params![dictionary_id], |row| {
        Ok(DictionaryWord {
            dictionary_id: row.get(0)?,
            word_id: row.get(1)?,
            data: row.get(2)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::schema::init_schema;

    fn setup_test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let conn = open_database(db_path.to_str().unwrap()).unwrap();
        init_schema(&conn, &TableNames::default(), Dialect::Embedded).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_insert_and_get_dictionary() {
        let (_dir, conn) = setup_test_db();
        let tables = TableNames::default();

        let info = DictionaryInfo::new("Test").with_author("A").with_description("d");
        let id = insert_dictionary(&conn, &tables.dictionaries, &info).unwrap();

        let dict = get_dictionary(&conn, &tables, id).unwrap().unwrap();
        assert_eq!(dict.title, "Test");
        assert_eq!(dict.author, "A");
        assert_eq!(dict.website, "");
        assert_eq!(dict.description, "d");
    }

    #[test]
    fn test_dictionary_ids_are_increasing() {
        let (_dir, conn) = setup_test_db();
        let tables = TableNames::default();

        let first = insert_dictionary(&conn, "dicts", &DictionaryInfo::new("One")).unwrap();
        let second = insert_dictionary(&conn, "dicts", &DictionaryInfo::new("Two")).unwrap();
        assert!(second > first);

        let titles: Vec<String> = list_dictionaries(&conn, &tables)
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_insert_dictionary_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = insert_dictionary(&conn, "dicts", &DictionaryInfo::new("Test")).unwrap_err();
        assert!(matches!(err, Error::Registration(_)));
    }

    #[test]
    fn test_get_missing_dictionary() {
        let (_dir, conn) = setup_test_db();
        assert!(get_dictionary(&conn, &TableNames::default(), 42)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_find_word_id() {
        let (_dir, conn) = setup_test_db();
        let tables = TableNames::default();

        conn.execute("INSERT INTO words (word) VALUES ('alpha')", [])
            .unwrap();
        let id = conn.last_insert_rowid();

        assert_eq!(find_word_id(&conn, &tables, "alpha").unwrap(), Some(id));
        assert_eq!(find_word_id(&conn, &tables, "beta").unwrap(), None);

        let word = get_word(&conn, &tables, id).unwrap().unwrap();
        assert_eq!(word.word, "alpha");
        assert!(get_word(&conn, &tables, id + 1).unwrap().is_none());
    }

    #[test]
    fn test_count_rows() {
        let (_dir, conn) = setup_test_db();

        assert_eq!(count_rows(&conn, "words").unwrap(), 0);
        conn.execute_batch("INSERT INTO words (word) VALUES ('a'); INSERT INTO words (word) VALUES ('b');")
            .unwrap();
        assert_eq!(count_rows(&conn, "words").unwrap(), 2);
    }

    #[test]
    fn test_count_links() {
        let (_dir, conn) = setup_test_db();
        let tables = TableNames::default();

        conn.execute_batch(
            "INSERT INTO dict_words (dict_id, word_id, data) VALUES (1, 1, 'a'); \
             INSERT INTO dict_words (dict_id, word_id, data) VALUES (1, 2, 'b'); \
             INSERT INTO dict_words (dict_id, word_id, data) VALUES (2, 1, 'c');",
        )
        .unwrap();
        assert_eq!(count_links(&conn, &tables, 1).unwrap(), 2);
        assert_eq!(count_links(&conn, &tables, 3).unwrap(), 0);
    }
}
