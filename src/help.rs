//! Usage text generated from an option table.

use crate::kind::ValueKind;
use crate::table::{Descriptor, OptionTable};

/// Render usage text for `program`.
///
/// Options are listed per section with their default in brackets and their
/// description. Columns are aligned across the whole table.
pub fn render_usage<R>(program: &str, table: &OptionTable<R>) -> String {
    let mut out = String::new();
    out.push_str("Usage:\n");
    out.push_str(&format!("\t{program} [options]\n"));
    if let Some(help) = table.find_short('h').or_else(|| table.find_long("help")) {
        out.push_str(&format!("\t{program} {} [options]\n", flag(&table.descriptors()[help])));
    }
    if let Some(consumer) = table.descriptors().iter().find(|d| d.is_trailing_consumer()) {
        out.push_str(&format!("\t{program} {} [options] -- <command> [arguments]\n", flag(consumer)));
    }
    out.push('\n');
    out.push_str("You can prefix boolean options with \"no-\" to negate them. If an argument is\n");
    out.push_str("given multiple times, only the last argument matters.\n");

    let rows: Vec<(String, String, &str)> = table
        .descriptors()
        .iter()
        .map(|d| (left_column(d), default_column(d, table), d.description()))
        .collect();
    let left_width = rows.iter().map(|(l, _, _)| l.len()).max().unwrap_or(0);
    let default_width = rows.iter().map(|(_, d, _)| d.len()).max().unwrap_or(0);

    let mut sections = table.sections().iter().peekable();
    if sections.peek().is_none_or(|(start, _)| *start > 0) {
        out.push('\n');
    }
    for (idx, (left, default, doc)) in rows.iter().enumerate() {
        while let Some((_, title)) = sections.next_if(|(start, _)| *start == idx) {
            out.push_str(&format!("\n{title}:\n"));
        }
        let line = format!("\t{left:<left_width$} {default:<default_width$} {doc}");
        out.push_str(&format!("{}\n", line.trim_end()));
    }
    out
}

fn flag<R>(d: &Descriptor<R>) -> String {
    match d.short() {
        Some(c) => format!("-{c}"),
        None => format!("--{}", d.long()),
    }
}

fn left_column<R>(d: &Descriptor<R>) -> String {
    let short = match d.short() {
        Some(c) => format!("-{c}, "),
        None => "    ".to_string(),
    };
    let placeholder = d.slot().kind().placeholder();
    if placeholder.is_empty() {
        format!("{short}--{}", d.long())
    } else {
        format!("{short}--{} {placeholder}", d.long())
    }
}

fn default_column<R>(d: &Descriptor<R>, table: &OptionTable<R>) -> String {
    let rendered = match (d.slot().kind(), d.slot().render_default(table.keysyms())) {
        (ValueKind::Boolean, Some(v)) => {
            if v == "true" {
                "on".to_string()
            } else {
                "off".to_string()
            }
        }
        (ValueKind::VtDevice, None) => "auto".to_string(),
        (_, Some(v)) if !v.is_empty() => v,
        _ => "-".to_string(),
    };
    format!("[{rendered}]")
}
