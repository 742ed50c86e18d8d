//! Command-line scanner.
//!
//! Accepted forms, scanned left to right from `argv[1]` (`argv[0]` is the
//! program name):
//!
//! | Form              | Meaning                                        |
//! |-------------------|------------------------------------------------|
//! | `--name`          | set a boolean                                  |
//! | `--no-name`       | clear a boolean                                |
//! | `--name value`    | value option, value in the next token          |
//! | `--name=value`    | value option, joined value                     |
//! | `-x` / `-xyz`     | short boolean(s); clusters allowed             |
//! | `-t value`/`-tvalue` | short value option                          |
//! | `--`              | stop; everything after is a trailing argument  |
//!
//! Unknown names and bare positional tokens are errors. Options already
//! applied stay applied when a later token fails.

use tracing::debug;

use crate::error::ConfError;
use crate::table::OptionTable;

const TERMINATOR: &str = "--";

/// Apply every option in `argv` to `record`.
///
/// Returns the index of the first trailing argument if `--` was seen.
pub fn scan<R>(table: &OptionTable<R>, record: &mut R, argv: &[String]) -> Result<Option<usize>, ConfError> {
    let mut i = 1;
    while i < argv.len() {
        let token = argv[i].as_str();
        i += 1;

        if token == TERMINATOR {
            return Ok(Some(i));
        }

        if let Some(body) = token.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let (idx, negated) = table.resolve_long(name)?;
            let descriptor = &table.descriptors()[idx];

            if !descriptor.slot().kind().takes_argument() {
                if inline.is_some() {
                    return Err(ConfError::UnexpectedArgument {
                        name: descriptor.long().to_string(),
                    });
                }
                apply(table, record, idx, "", negated)?;
                continue;
            }

            let value = match inline {
                Some(v) => v,
                None => {
                    let v = argv.get(i).ok_or_else(|| ConfError::MissingArgument {
                        name: descriptor.long().to_string(),
                    })?;
                    i += 1;
                    v.as_str()
                }
            };
            apply(table, record, idx, value, false)?;
            continue;
        }

        let Some(cluster) = token.strip_prefix('-').filter(|c| !c.is_empty()) else {
            return Err(ConfError::StrayArgument(token.to_string()));
        };

        for (pos, c) in cluster.char_indices() {
            let idx = table
                .find_short(c)
                .ok_or_else(|| ConfError::UnknownOption(format!("-{c}")))?;
            let descriptor = &table.descriptors()[idx];

            if !descriptor.slot().kind().takes_argument() {
                apply(table, record, idx, "", false)?;
                continue;
            }

            let attached = &cluster[pos + c.len_utf8()..];
            let value = if !attached.is_empty() {
                attached
            } else {
                let v = argv.get(i).ok_or_else(|| ConfError::MissingArgument {
                    name: descriptor.long().to_string(),
                })?;
                i += 1;
                v.as_str()
            };
            apply(table, record, idx, value, false)?;
            break;
        }
    }
    Ok(None)
}

/// Parse one value into the slot of descriptor `idx`.
pub(crate) fn apply<R>(
    table: &OptionTable<R>,
    record: &mut R,
    idx: usize,
    value: &str,
    negated: bool,
) -> Result<(), ConfError> {
    let descriptor = &table.descriptors()[idx];
    descriptor
        .slot()
        .parse(record, value, negated, table.keysyms())
        .map_err(|e| ConfError::invalid_value(descriptor.long(), e))?;
    debug!(option = descriptor.long(), negated, "applied option");
    Ok(())
}
