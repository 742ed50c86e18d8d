//! Keysym table boundary.
//!
//! Shortcut parsing resolves symbol names through a [`KeysymTable`]. The
//! engine ships [`XkbKeysyms`], a table of the X keysym names a console needs
//! (letters, digits, navigation and function keys); a caller with access to a
//! full keyboard library can plug its own table into the option table.

use crate::types::Keysym;

pub const RETURN: Keysym = Keysym(0xff0d);
pub const LEFT: Keysym = Keysym(0xff51);
pub const UP: Keysym = Keysym(0xff52);
pub const RIGHT: Keysym = Keysym(0xff53);
pub const DOWN: Keysym = Keysym(0xff54);
pub const PRIOR: Keysym = Keysym(0xff55);
pub const NEXT: Keysym = Keysym(0xff56);
pub const LOWER_W: Keysym = Keysym(0x0077);

/// Resolves symbol names to identifiers and back.
///
/// Names are case-sensitive: `w` and `W` are different symbols.
pub trait KeysymTable: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Keysym>;

    /// Canonical name of a symbol, if the table knows one.
    fn name(&self, sym: Keysym) -> Option<String>;
}

/// Built-in subset of the X keysym names.
#[derive(Debug, Clone, Copy, Default)]
pub struct XkbKeysyms;

// First entry for a value is its canonical name.
const NAMED: &[(&str, u32)] = &[
    ("space", 0x0020),
    ("exclam", 0x0021),
    ("numbersign", 0x0023),
    ("dollar", 0x0024),
    ("percent", 0x0025),
    ("ampersand", 0x0026),
    ("apostrophe", 0x0027),
    ("parenleft", 0x0028),
    ("parenright", 0x0029),
    ("asterisk", 0x002a),
    ("plus", 0x002b),
    ("comma", 0x002c),
    ("minus", 0x002d),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("colon", 0x003a),
    ("semicolon", 0x003b),
    ("less", 0x003c),
    ("equal", 0x003d),
    ("greater", 0x003e),
    ("question", 0x003f),
    ("at", 0x0040),
    ("bracketleft", 0x005b),
    ("backslash", 0x005c),
    ("bracketright", 0x005d),
    ("underscore", 0x005f),
    ("grave", 0x0060),
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14),
    ("Escape", 0xff1b),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Prior", 0xff55),
    ("Page_Up", 0xff55),
    ("Next", 0xff56),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Print", 0xff61),
    ("Insert", 0xff63),
    ("Menu", 0xff67),
    ("Num_Lock", 0xff7f),
    ("KP_Enter", 0xff8d),
    ("Delete", 0xffff),
];

const F1: u32 = 0xffbe;

impl KeysymTable for XkbKeysyms {
    fn lookup(&self, name: &str) -> Option<Keysym> {
        if let Some((_, value)) = NAMED.iter().find(|(n, _)| *n == name) {
            return Some(Keysym(*value));
        }

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && c.is_ascii_alphanumeric()
        {
            return Some(Keysym(c as u32));
        }

        let digits = name.strip_prefix('F')?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: u32 = digits.parse().ok()?;
        if (1..=35).contains(&n) && !name.starts_with("F0") {
            return Some(Keysym(F1 + n - 1));
        }
        None
    }

    fn name(&self, sym: Keysym) -> Option<String> {
        if let Some((name, _)) = NAMED.iter().find(|(_, v)| *v == sym.0) {
            return Some((*name).to_string());
        }
        if let Some(c) = char::from_u32(sym.0)
            && c.is_ascii_alphanumeric()
        {
            return Some(c.to_string());
        }
        if (F1..F1 + 35).contains(&sym.0) {
            return Some(format!("F{}", sym.0 - F1 + 1));
        }
        None
    }
}
