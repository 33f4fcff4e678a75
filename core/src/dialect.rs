//! SQL dialect detection
//!
//! The only dialect-specific piece of the schema is the auto-numbering
//! primary key. Everything else in the DDL is shared.

use rusqlite::Connection;

/// Store handles that can report which driver backs them
pub trait StoreInfo {
    /// Driver name, e.g. `"sqlite"` or `"mysql"`
    fn driver_name(&self) -> &str;
}

impl StoreInfo for Connection {
    fn driver_name(&self) -> &str {
        "sqlite"
    }
}

/// SQL variant of the backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Embedded file engines with implicit integer row ids
    Embedded,
    /// Server engines needing an explicit auto-increment column
    Server,
}

impl Dialect {
    /// Classify a driver name. Unknown drivers are treated as servers.
    pub fn from_driver_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Dialect::Embedded,
            _ => Dialect::Server,
        }
    }

    /// Column definition for an auto-numbering primary key
    pub fn primary_key(&self) -> &'static str {
        match self {
            Dialect::Embedded => "INTEGER PRIMARY KEY",
            Dialect::Server => "INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY",
        }
    }

    /// Column type of the dictionary description
    ///
    /// Server TEXT columns cannot carry a literal default, so there the
    /// empty string comes from the registrar alone.
    pub fn description_column(&self) -> &'static str {
        match self {
            Dialect::Embedded => "TEXT DEFAULT ''",
            Dialect::Server => "TEXT",
        }
    }
}

/// Resolve the dialect of a store handle
pub fn resolve<S: StoreInfo + ?Sized>(store: &S) -> Dialect {
    let dialect = Dialect::from_driver_name(store.driver_name());
    log::debug!("Driver {:?} resolved to {:?} dialect", store.driver_name(), dialect);
    dialect
}
