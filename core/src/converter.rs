//! Import lifecycle
//!
//! A run goes through `init`, one `process` call per source entry, and
//! `finalize`. Any failure is followed by `abort`, which rolls the store
//! back to where it was before `init` when the run owns a transaction.
//!
//! Word rows are deduplicated against the whole store: `process` looks the
//! headword up before inserting it, so entries must be applied one at a time
//! and in source order. The lookup-then-insert pair is not atomic, which is
//! why only one run may write to a store at a time.

use rusqlite::Connection;

use crate::config::ConverterConfig;
use crate::models::{DictionaryInfo, Entry};
use crate::statements::Statements;
use crate::{db, dialect, schema, Error, Result};

/// Progress is reported every this many entries
const PROGRESS_INTERVAL: u64 = 1000;

/// Counters collected during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// ID of the dictionary registered by this run
    pub dictionary_id: i64,
    /// Number of entries applied
    pub entries_processed: u64,
    /// Number of new rows in the words table
    pub words_added: u64,
    /// Number of entries whose word already existed
    pub words_reused: u64,
    /// Number of rows in the link table
    pub links_added: u64,
}

/// Where a run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    Initialized,
    Processing,
    Committed,
    /// COMMIT failed; the transaction may still be open until `abort`
    CommitFailed,
    RolledBack,
    /// Aborted without a transaction to roll back
    Aborted,
}

/// Result of aborting a run
#[derive(Debug)]
pub enum AbortOutcome {
    /// The run's transaction was rolled back; the store is unchanged
    RolledBack,
    /// No transaction was active; writes made so far remain
    NoTransaction,
    /// The rollback itself failed; the store state is unknown
    RollbackFailed(Error),
}

/// Lifecycle of a conversion into a backing store
///
/// Implementations are driven by [`convert`], which calls the methods in a
/// fixed order regardless of the backend.
pub trait Converter {
    /// Prepare the store for a run of the given dictionary
    fn init(&mut self, info: &DictionaryInfo) -> Result<()>;

    /// Apply one source entry
    fn process(&mut self, word: &str, data: &str) -> Result<()>;

    /// Make the run durable and return its statistics
    fn finalize(&mut self) -> Result<ImportStats>;

    /// Discard the run after a failure
    fn abort(&mut self) -> AbortOutcome;
}

/// Converter writing into a SQLite database
pub struct SqliteConverter<'conn> {
    config: ConverterConfig,
    conn: Option<&'conn Connection>,
    statements: Option<Statements<'conn>>,
    dictionary_id: Option<i64>,
    in_transaction: bool,
    state: RunState,
    stats: ImportStats,
}

impl<'conn> SqliteConverter<'conn> {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            conn: None,
            statements: None,
            dictionary_id: None,
            in_transaction: false,
            state: RunState::Uninitialized,
            stats: ImportStats::default(),
        }
    }

    /// Attach the store handle the run writes into
    pub fn with_connection(mut self, conn: &'conn Connection) -> Self {
        self.conn = Some(conn);
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// ID of the dictionary registered by `init`
    pub fn dictionary_id(&self) -> Option<i64> {
        self.dictionary_id
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    fn store(&self) -> Result<&'conn Connection> {
        self.conn.ok_or(Error::StoreNotReady)
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state {
            RunState::Initialized | RunState::Processing => Ok(()),
            RunState::Uninitialized => Err(Error::NotInitialized),
            state => Err(Error::InvalidState(state)),
        }
    }
}

impl<'conn> Converter for SqliteConverter<'conn> {
    fn init(&mut self, info: &DictionaryInfo) -> Result<()> {
        if self.state != RunState::Uninitialized {
            return Err(Error::InvalidState(self.state));
        }
        let conn = self.store()?;
        let tables = self.config.tables()?;

        if self.config.transaction {
            conn.execute_batch("BEGIN").map_err(Error::transaction)?;
            self.in_transaction = true;
        }

        if self.config.init_schema {
            schema::init_schema(conn, &tables, dialect::resolve(conn))?;
        }

        let dictionary_id = db::insert_dictionary(conn, &tables.dictionaries, info)?;
        log::debug!("Registered dictionary {:?} as {}", info.title, dictionary_id);

        self.statements = Some(Statements::prepare(conn, &tables)?);
        self.dictionary_id = Some(dictionary_id);
        self.stats = ImportStats {
            dictionary_id,
            ..Default::default()
        };
        self.state = RunState::Initialized;
        Ok(())
    }

    fn process(&mut self, word: &str, data: &str) -> Result<()> {
        self.ensure_running()?;
        let dictionary_id = self.dictionary_id.ok_or(Error::NotInitialized)?;
        let statements = self.statements.as_mut().ok_or(Error::NotInitialized)?;
        self.state = RunState::Processing;

        let word_id = match statements.check_word(word)? {
            Some(id) => {
                self.stats.words_reused += 1;
                id
            }
            None => {
                let id = statements.add_word(word)?;
                self.stats.words_added += 1;
                id
            }
        };

        statements.add_link(dictionary_id, word_id, data)?;
        self.stats.links_added += 1;
        self.stats.entries_processed += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<ImportStats> {
        self.ensure_running()?;
        let conn = self.store()?;

        // Pending statements would keep the transaction busy
        self.statements = None;

        if self.in_transaction {
            if let Err(e) = conn.execute_batch("COMMIT") {
                self.state = RunState::CommitFailed;
                return Err(Error::transaction(e));
            }
            self.in_transaction = false;
        }
        self.state = RunState::Committed;

        log::info!(
            "Committed dictionary {}: {} entries, {} new words, {} reused",
            self.stats.dictionary_id,
            self.stats.entries_processed,
            self.stats.words_added,
            self.stats.words_reused
        );
        Ok(self.stats.clone())
    }

    fn abort(&mut self) -> AbortOutcome {
        self.statements = None;

        if self.state == RunState::Committed {
            return AbortOutcome::NoTransaction;
        }

        // A failed statement or commit may already have ended the transaction
        let outcome = match self.conn {
            Some(conn) if self.in_transaction && !conn.is_autocommit() => {
                match conn.execute_batch("ROLLBACK") {
                    Ok(()) => AbortOutcome::RolledBack,
                    Err(e) => AbortOutcome::RollbackFailed(Error::transaction(e)),
                }
            }
            _ => AbortOutcome::NoTransaction,
        };

        self.in_transaction = false;
        self.state = match outcome {
            AbortOutcome::RolledBack => RunState::RolledBack,
            _ => RunState::Aborted,
        };
        outcome
    }
}

impl Drop for SqliteConverter<'_> {
    fn drop(&mut self) {
        if self.in_transaction {
            log::warn!("Converter dropped with an open transaction, rolling back");
            self.abort();
        }
    }
}

/// Run a full import: init, one process call per entry, finalize
///
/// On any failure, including a source error or a failed commit, the run is
/// aborted and the original error is returned. A converter that refuses
/// `init` because it is not fresh is left untouched. `progress` receives the
/// number of entries applied so far.
pub fn convert<C, I>(
    converter: &mut C,
    info: &DictionaryInfo,
    entries: I,
    mut progress: impl FnMut(u64),
) -> Result<ImportStats>
where
    C: Converter + ?Sized,
    I: IntoIterator<Item = Result<Entry>>,
{
    match converter.init(info) {
        Ok(()) => {}
        // Another run owns this converter
        Err(e @ Error::InvalidState(_)) => return Err(e),
        Err(e) => return Err(fail(converter, info, e)),
    }

    run(converter, entries, &mut progress).map_err(|e| fail(converter, info, e))
}

/// Abort a failed run and hand back its error
fn fail<C: Converter + ?Sized>(converter: &mut C, info: &DictionaryInfo, e: Error) -> Error {
    match converter.abort() {
        AbortOutcome::RolledBack => {
            log::warn!("Import of {:?} failed, rolled back: {}", info.title, e)
        }
        AbortOutcome::NoTransaction => log::warn!(
            "Import of {:?} failed without a transaction, partial data remains: {}",
            info.title,
            e
        ),
        AbortOutcome::RollbackFailed(rollback_err) => log::error!(
            "Import of {:?} failed: {}; rollback failed: {}",
            info.title,
            e,
            rollback_err
        ),
    }
    e
}

fn run<C, I>(converter: &mut C, entries: I, progress: &mut impl FnMut(u64)) -> Result<ImportStats>
where
    C: Converter + ?Sized,
    I: IntoIterator<Item = Result<Entry>>,
{
    let mut processed = 0u64;
    for entry in entries {
        let entry = entry?;
        converter.process(&entry.word, &entry.data)?;
        processed += 1;

        if processed % PROGRESS_INTERVAL == 0 {
            progress(processed);
        }
    }

    let stats = converter.finalize()?;
    progress(processed);
    Ok(stats)
}
