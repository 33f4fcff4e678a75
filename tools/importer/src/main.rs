//! Dictionary import tool
//!
//! Converts tab-separated dictionary files into the dictionaries, words and
//! links tables of a SQLite database. Headwords are shared between all
//! dictionaries imported into the same database.
//!
//! # Usage
//!
//! ```bash
//! # First import, creating the schema
//! dictdb-import --input english.tab --output dict.db --title "English" --init-schema
//!
//! # Add a second dictionary to the same database
//! dictdb-import --input french.tab.gz --output dict.db --title "French" --author "Someone"
//!
//! # Show registered dictionaries
//! dictdb-import --output dict.db --list
//! ```

mod tabfile;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use dictdb_core::{convert, db, Connection, ConverterConfig, DictionaryInfo, SqliteConverter};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::tabfile::{count_entries, open_source, TabReader};

/// Dictionary importer - converts tab files to SQLite
#[derive(Parser, Debug)]
#[command(name = "dictdb-import")]
#[command(author, version, about = "Import tab-separated dictionaries into a SQLite database")]
#[command(long_about = "
Imports a tab-separated dictionary (word<TAB>data per line) into a SQLite
database. Each headword is stored once per database; every entry becomes a
link between the dictionary and the word carrying the entry data.

Supports both raw tab files and gzip-compressed files (.gz).

Example usage:
  dictdb-import -i english.tab -o dict.db --title English --init-schema
  dictdb-import -i french.tab.gz -o dict.db --title French
  dictdb-import -o dict.db --list
")]
struct Args {
    /// Input tab file path (supports .gz)
    #[arg(short, long, required_unless_present = "list")]
    input: Option<PathBuf>,

    /// SQLite database path
    #[arg(short, long)]
    output: PathBuf,

    /// Dictionary title (defaults to the input file name)
    #[arg(long)]
    title: Option<String>,

    /// Dictionary author
    #[arg(long)]
    author: Option<String>,

    /// Dictionary website
    #[arg(long)]
    website: Option<String>,

    /// Dictionary description
    #[arg(long)]
    description: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drop and recreate all tables before importing
    #[arg(long, default_value = "false")]
    init_schema: bool,

    /// Do not wrap the import in a transaction
    #[arg(long, default_value = "false")]
    no_transaction: bool,

    /// Override the dictionaries table name
    #[arg(long)]
    table_dictionaries: Option<String>,

    /// Override the words table name
    #[arg(long)]
    table_words: Option<String>,

    /// Override the dictionary words table name
    #[arg(long)]
    table_dictionary_words: Option<String>,

    /// List registered dictionaries and exit
    #[arg(long, default_value = "false")]
    list: bool,

    /// Quiet mode - suppress progress bar
    #[arg(short, long, default_value = "false")]
    quiet: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = build_config(&args)?;
    check_paths(&args)?;

    let conn = db::open_database(args.output.to_str().context("Invalid output path")?)
        .context("Failed to open database")?;

    if args.list {
        return list(&conn, &config);
    }

    let input = args.input.as_ref().context("No input file given")?;
    let info = dictionary_info(&args, input);

    println!("Input:      {:?}", input);
    println!("Output:     {:?}", args.output);
    println!("Dictionary: {}", info.title);
    println!();

    log::info!("Starting import from {:?} to {:?}", input, args.output);

    let start_time = Instant::now();

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(count_entries(input).context("Failed to read input file")?)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries ({eta})")?
            .progress_chars("#>-"),
    );

    let source = open_source(input).context("Failed to open input file")?;
    let tables = config.tables()?;
    let mut converter = SqliteConverter::new(config).with_connection(&conn);

    let pb_clone = pb.clone();
    let stats = convert(&mut converter, &info, TabReader::new(source), move |current| {
        pb_clone.set_position(current)
    })
    .context("Import failed")?;

    pb.finish_and_clear();

    let elapsed = start_time.elapsed();

    println!("Import complete!");
    println!();
    println!("Statistics:");
    println!("  Dictionary ID:      {:>12}", stats.dictionary_id);
    println!("  Entries processed:  {:>12}", format_number(stats.entries_processed));
    println!("  New words:          {:>12}", format_number(stats.words_added));
    println!("  Reused words:       {:>12}", format_number(stats.words_reused));
    println!("  Links:              {:>12}", format_number(stats.links_added));
    println!();
    println!("Store totals:");
    println!("  Dictionaries:       {:>12}", format_number(db::count_rows(&conn, &tables.dictionaries)? as u64));
    println!("  Words:              {:>12}", format_number(db::count_rows(&conn, &tables.words)? as u64));
    println!("  Links:              {:>12}", format_number(db::count_rows(&conn, &tables.dictionary_words)? as u64));
    println!();
    println!("Performance:");
    println!("  Time elapsed:       {:>12}", HumanDuration(elapsed));

    if elapsed.as_secs() > 0 {
        let entries_per_sec = stats.entries_processed / elapsed.as_secs();
        println!("  Entries/second:     {:>12}", format_number(entries_per_sec));
    }

    log::info!(
        "Successfully imported {} entries into {:?} in {:?}",
        stats.entries_processed,
        args.output,
        elapsed
    );

    Ok(())
}

/// Fail before the database is opened, which would create it
fn check_paths(args: &Args) -> Result<()> {
    if args.list {
        if !args.output.exists() {
            anyhow::bail!("Database does not exist: {:?}", args.output);
        }
        return Ok(());
    }

    let input = args.input.as_ref().context("No input file given")?;
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }
    Ok(())
}

/// Print the dictionaries already registered in the database
fn list(conn: &Connection, config: &ConverterConfig) -> Result<()> {
    let tables = config.tables()?;
    let dictionaries =
        db::list_dictionaries(conn, &tables).context("Failed to list dictionaries")?;

    if dictionaries.is_empty() {
        println!("No dictionaries registered.");
        return Ok(());
    }

    for dict in dictionaries {
        let links = db::count_links(conn, &tables, dict.id)?;
        println!("{:>6}  {}  ({} entries)", dict.id, dict.title, format_number(links as u64));
        if !dict.author.is_empty() {
            println!("        by {}", dict.author);
        }
    }
    Ok(())
}

/// Load the configuration file, then apply command-line overrides
fn build_config(args: &Args) -> Result<ConverterConfig> {
    let mut config = match &args.config {
        Some(path) => ConverterConfig::from_path(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => ConverterConfig::default(),
    };

    if args.init_schema {
        config.init_schema = true;
    }
    if args.no_transaction {
        config.transaction = false;
    }
    if let Some(name) = &args.table_dictionaries {
        config.table_dictionaries = name.clone();
    }
    if let Some(name) = &args.table_words {
        config.table_words = name.clone();
    }
    if let Some(name) = &args.table_dictionary_words {
        config.table_dictionary_words = name.clone();
    }
    Ok(config)
}

/// Dictionary metadata from the flags, titled after the input file by default
fn dictionary_info(args: &Args, input: &std::path::Path) -> DictionaryInfo {
    let title = args.title.clone().unwrap_or_else(|| {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.split('.').next().unwrap_or_default().to_string()
    });

    DictionaryInfo {
        title,
        author: args.author.clone(),
        website: args.website.clone(),
        description: args.description.clone(),
    }
}

/// Format a number with thousand separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
