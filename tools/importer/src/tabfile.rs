//! Tab-separated dictionary source
//!
//! Each non-blank line holds one entry: the headword, a tab, then the entry
//! data. Inside the data `\n`, `\t` and `\\` stand for a newline, a tab and
//! a backslash. Files ending in `.gz` are decompressed on the fly.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use dictdb_core::{Entry, Error};
use flate2::read::GzDecoder;

/// Whether a path names a gzip-compressed file
pub fn is_gzipped(path: &Path) -> bool {
    path.extension().map(|ext| ext == "gz").unwrap_or(false)
}

/// Open a tab file for reading, transparently handling gzip
pub fn open_source(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Count the entries of a tab file for progress reporting
///
/// Blank lines are skipped the same way [`TabReader`] skips them.
pub fn count_entries(path: &Path) -> io::Result<u64> {
    let mut count = 0;
    for line in open_source(path)?.lines() {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Iterator over the entries of a tab file
pub struct TabReader<R> {
    lines: io::Lines<R>,
    line_number: u64,
}

impl<R: BufRead> TabReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Result<Entry, Error> {
        let (word, data) = line.split_once('\t').ok_or_else(|| {
            invalid_data(format!("line {}: missing tab separator", self.line_number))
        })?;
        if word.is_empty() {
            return Err(invalid_data(format!("line {}: empty headword", self.line_number)));
        }
        Ok(Entry::new(word, unescape(data)))
    }
}

impl<R: BufRead> Iterator for TabReader<R> {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            let line = line.strip_suffix('\r').unwrap_or(line.as_str());
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(line));
        }
    }
}

fn invalid_data(message: String) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, message))
}

/// Expand `\n`, `\t` and `\\`. Other backslashes are kept as-is.
fn unescape(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    let mut chars = data.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
