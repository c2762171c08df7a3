//! Whitespace-delimited list file parser

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use crate::{Error, Result};

/// One non-blank line of a list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: usize,
    fields: Vec<String>,
}

impl Row {
    /// 1-based line number in the source file.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Column value. The parser guarantees the column count.
    #[must_use]
    pub fn field(&self, index: usize) -> &str {
        &self.fields[index]
    }

    /// All column values.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Parse a list file into rows of exactly `columns` fields.
///
/// A missing file is an error only when `required` is set; an absent optional
/// list yields no rows.
///
/// # Errors
///
/// - [`Error::MissingFile`] if a required file does not exist
/// - [`Error::MalformedRow`] if a non-blank line has the wrong column count
/// - [`Error::Io`] on any other read failure (not retried)
pub fn parse(path: &Path, columns: usize, required: bool) -> Result<Vec<Row>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if required {
                return Err(Error::MissingFile {
                    path: path.to_path_buf(),
                });
            }
            tracing::debug!(path = %path.display(), "optional list absent");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let rows = parse_reader(BufReader::new(file), path, columns)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "list read");
    Ok(rows)
}

/// Parse rows from any buffered reader; `source` only labels errors.
///
/// # Errors
///
/// Returns [`Error::MalformedRow`] or [`Error::Io`] as [`parse`] does.
pub fn parse_reader<R: BufRead>(reader: R, source: &Path, columns: usize) -> Result<Vec<Row>> {
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != columns {
            return Err(Error::MalformedRow {
                path: source.to_path_buf(),
                line: index + 1,
                expected: columns,
                found: fields.len(),
            });
        }
        rows.push(Row {
            line: index + 1,
            fields,
        });
    }

    Ok(rows)
}
