//! Config operations: template generation, key lookup, listing, and result types.
//!
//! Every value is rendered in the same syntax the parser accepts, so a
//! listing or a template can be pasted into a config file as is.

use std::fmt;

use serde::Serialize;

use crate::context::Context;
use crate::error::ConfError;
use crate::kind::ValueKind;
use crate::table::{Descriptor, OptionTable};

const NOT_SET: &str = "<not set>";

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A generated config file template.
    Template(String),
    /// One option's resolved value and its description.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// Every option with its resolved value, in table order.
    Listing { entries: Vec<(String, String)> },
    /// The resolved settings record as pretty-printed JSON.
    Json(String),
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Template(t) => write!(f, "{t}"),
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
            ConfigResult::Json(json) => write!(f, "{json}"),
        }
    }
}

/// Generate a config file with every option commented out at its default.
///
/// Removing the leading `#` from an option line reproduces the default.
/// Options without a default are shown with a placeholder after `# `.
pub fn generate_template<R>(app_name: &str, table: &OptionTable<R>) -> ConfigResult {
    let mut out = format!("# {app_name} configuration\n");
    let mut sections = table.sections().iter().peekable();

    for (idx, d) in table.descriptors().iter().enumerate() {
        while let Some((_, title)) = sections.next_if(|(start, _)| *start == idx) {
            out.push_str(&format!("\n## {title}\n"));
        }
        if !d.description().is_empty() {
            out.push_str(&format!("# {}\n", d.description()));
        }
        out.push_str(&template_line(d, table));
        out.push('\n');
    }
    ConfigResult::Template(out)
}

fn template_line<R>(d: &Descriptor<R>, table: &OptionTable<R>) -> String {
    let kind = d.slot().kind();
    match d.slot().render_default(table.keysyms()) {
        Some(default) if kind == ValueKind::Boolean => {
            if default == "true" {
                format!("#{}", d.long())
            } else {
                format!("#no-{}", d.long())
            }
        }
        Some(default) => format!("#{}", file_line(d.long(), &default)),
        None => format!("# {} {}", d.long(), kind.placeholder()),
    }
}

fn file_line(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{name}=")
    } else {
        format!("{name} {value}")
    }
}

/// Get one option's resolved value by long name.
pub fn get_value<R>(ctx: &Context<'_, R>, key: &str) -> Result<ConfigResult, ConfError> {
    let table = ctx.table();
    let idx = table
        .find_long(key)
        .ok_or_else(|| ConfError::UnknownOption(key.to_string()))?;
    let d = &table.descriptors()[idx];

    let doc = match d.description() {
        "" => Vec::new(),
        text => vec![text.to_string()],
    };
    Ok(ConfigResult::KeyValue {
        key: key.to_string(),
        value: render(d, ctx),
        doc,
    })
}

/// List every option with its resolved value.
pub fn list_values<R>(ctx: &Context<'_, R>) -> ConfigResult {
    let entries = ctx
        .table()
        .descriptors()
        .iter()
        .map(|d| (d.long().to_string(), render(d, ctx)))
        .collect();
    ConfigResult::Listing { entries }
}

/// Serialize the whole settings record, derived fields included.
///
/// Shortcut values are written through `Chord`'s `Serialize`, which uses the
/// built-in keysym names even when the table carries its own.
pub fn dump_json<R: Serialize>(ctx: &Context<'_, R>) -> Result<ConfigResult, ConfError> {
    Ok(ConfigResult::Json(serde_json::to_string_pretty(ctx.settings())?))
}

fn render<R>(d: &Descriptor<R>, ctx: &Context<'_, R>) -> String {
    d.slot()
        .render(ctx.settings(), ctx.table().keysyms())
        .unwrap_or_else(|| NOT_SET.to_string())
}
