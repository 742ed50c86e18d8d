//! Config file reading and tokenizing.
//!
//! The format is line oriented and uses the long option names:
//!
//! ```text
//! # comment
//! verbose
//! no-switchvt
//! font-size 14
//! term=linux
//! seats = seat0,seat1
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A name is separated
//! from its value by whitespace or `=`; a line without a value is a bare
//! boolean. Surrounding whitespace on the value is dropped.
//!
//! A missing file is not an error. A file that exists but cannot be read is
//! reported as [`ConfError::IoError`] so callers can tell the two apart. Bytes
//! that are not UTF-8 are content, not an I/O failure: see [`decode`].

use std::path::{Path, PathBuf};

use crate::error::ConfError;

const COMMENT: char = '#';

/// One `name [value]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    /// 1-based line number.
    pub line: usize,
    pub name: &'a str,
    pub value: Option<&'a str>,
}

/// Read `path`, mapping "not found" to `Ok(None)`.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, ConfError> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Decode file bytes as UTF-8.
///
/// On invalid input the text is cut before the offending line, which is
/// returned (1-based) alongside so the lines above it can still be applied.
pub fn decode(bytes: Vec<u8>) -> (String, Option<usize>) {
    let err = match String::from_utf8(bytes) {
        Ok(text) => return (text, None),
        Err(err) => err,
    };
    let valid = err.utf8_error().valid_up_to();
    let mut bytes = err.into_bytes();
    let start = bytes[..valid]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |at| at + 1);
    let line = bytes[..start].iter().filter(|&&b| b == b'\n').count() + 1;
    bytes.truncate(start);
    (String::from_utf8(bytes).unwrap_or_default(), Some(line))
}

/// Split file content into entries, skipping blanks and comments.
///
/// Fails on the first malformed line.
pub fn entries<'a>(content: &'a str, path: &Path) -> Result<Vec<Entry<'a>>, ConfError> {
    let mut out = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT) {
            continue;
        }
        out.push(tokenize(line, i + 1, path)?);
    }
    Ok(out)
}

fn tokenize<'a>(line: &'a str, number: usize, path: &Path) -> Result<Entry<'a>, ConfError> {
    let split = line.find(|c: char| c == '=' || c.is_whitespace());
    let (name, value) = match split {
        Some(at) => {
            let rest = line[at..].trim_start();
            let rest = rest.strip_prefix('=').unwrap_or(rest).trim();
            (&line[..at], Some(rest))
        }
        None => (line, None),
    };

    if name.is_empty() {
        return Err(ConfError::Syntax {
            path: path.to_path_buf(),
            line: number,
            message: "missing option name".into(),
        });
    }
    if name.starts_with('-') {
        return Err(ConfError::Syntax {
            path: path.to_path_buf(),
            line: number,
            message: format!("option names in files are written without dashes: '{name}'"),
        });
    }

    Ok(Entry {
        line: number,
        name,
        value,
    })
}

/// Path of the per-seat file: `{dir}/{seat}.seat.conf`.
pub fn seat_file(dir: &Path, seat: &str) -> PathBuf {
    dir.join(format!("{seat}.seat.conf"))
}
