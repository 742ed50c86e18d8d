//! Value kinds: how each type of setting is defaulted, parsed, duplicated and
//! disposed.
//!
//! The kind set is closed. A [`Slot`] pairs a kind with the accessor pair of
//! the record field it writes and the compiled-in default for that field, so
//! every operation is an exhaustive `match` instead of a table of function
//! pointers.
//!
//! Reference-typed fields hold [`Cow`] values: the default is `Borrowed` from
//! static data and owns nothing, anything parsed or copied is `Owned`.
//! Disposing replaces the value with an empty borrowed one, which makes it
//! idempotent and safe on a never-populated field.

use std::borrow::Cow;

use crate::chord;
use crate::error::ValueError;
use crate::keysym::KeysymTable;
use crate::types::{Chord, ChordStep, Text, TextList};

const VT_DIR: &str = "/dev/";
const VT_PREFIX: &str = "tty";
const LIST_DELIMITER: char = ',';

/// Bind a record field to an option: `field!(ConsoleConfig, font_size)`.
#[macro_export]
macro_rules! field {
    ($record:ty, $name:ident) => {
        $crate::Field::<$record, _>::new(|r| &r.$name, |r| &mut r.$name)
    };
}

/// A getter/setter pair for one field of a settings record.
///
/// Captured once when the option table is built; the same table then works
/// for any number of record instances.
pub struct Field<R, T> {
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R, T> Field<R, T> {
    pub const fn new(get: fn(&R) -> &T, get_mut: fn(&mut R) -> &mut T) -> Self {
        Self { get, get_mut }
    }

    pub fn get<'r>(&self, record: &'r R) -> &'r T {
        (self.get)(record)
    }

    pub fn get_mut<'r>(&self, record: &'r mut R) -> &'r mut T {
        (self.get_mut)(record)
    }
}

impl<R, T> Clone for Field<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T> Copy for Field<R, T> {}

/// The closed set of value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    UnsignedInt,
    String,
    StringList,
    ShortcutChord,
    VtDevice,
}

impl ValueKind {
    /// Booleans are flags; every other kind consumes a value.
    pub fn takes_argument(self) -> bool {
        !matches!(self, ValueKind::Boolean)
    }

    /// Placeholder shown in usage text.
    pub fn placeholder(self) -> &'static str {
        match self {
            ValueKind::Boolean => "",
            ValueKind::UnsignedInt => "<num>",
            ValueKind::String => "<string>",
            ValueKind::StringList => "<list,of,values>",
            ValueKind::ShortcutChord => "<grab>",
            ValueKind::VtDevice => "<vt>",
        }
    }
}

/// A field binding plus the kind-specific default.
pub enum Slot<R> {
    Boolean {
        field: Field<R, bool>,
        default: bool,
    },
    UnsignedInt {
        field: Field<R, u32>,
        default: u32,
    },
    String {
        field: Field<R, Option<Text>>,
        default: Option<&'static str>,
    },
    StringList {
        field: Field<R, TextList>,
        default: &'static [Text],
    },
    ShortcutChord {
        field: Field<R, Chord>,
        default: Chord,
    },
    VtDevice {
        field: Field<R, Option<Text>>,
    },
}

impl<R> Slot<R> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Slot::Boolean { .. } => ValueKind::Boolean,
            Slot::UnsignedInt { .. } => ValueKind::UnsignedInt,
            Slot::String { .. } => ValueKind::String,
            Slot::StringList { .. } => ValueKind::StringList,
            Slot::ShortcutChord { .. } => ValueKind::ShortcutChord,
            Slot::VtDevice { .. } => ValueKind::VtDevice,
        }
    }

    /// Write the compiled-in default. Never allocates.
    pub fn install_default(&self, record: &mut R) {
        self.dispose(record);
        match self {
            Slot::Boolean { field, default } => *field.get_mut(record) = *default,
            Slot::UnsignedInt { field, default } => *field.get_mut(record) = *default,
            Slot::String { field, default } => *field.get_mut(record) = default.map(Cow::Borrowed),
            Slot::StringList { field, default } => *field.get_mut(record) = Cow::Borrowed(*default),
            Slot::ShortcutChord { field, default } => *field.get_mut(record) = default.clone(),
            Slot::VtDevice { field } => *field.get_mut(record) = None,
        }
    }

    /// Release whatever the field owns and leave it empty.
    pub fn dispose(&self, record: &mut R) {
        match self {
            Slot::Boolean { .. } | Slot::UnsignedInt { .. } => {}
            Slot::String { field, .. } | Slot::VtDevice { field } => *field.get_mut(record) = None,
            Slot::StringList { field, .. } => *field.get_mut(record) = Cow::Borrowed(&[]),
            Slot::ShortcutChord { field, .. } => *field.get_mut(record) = Chord::EMPTY,
        }
    }

    /// Parse `arg` into the field.
    ///
    /// For booleans `arg` is ignored and `negated` selects the value. The new
    /// value is built completely before the old one is released, so a failed
    /// parse leaves the field untouched.
    pub fn parse(
        &self,
        record: &mut R,
        arg: &str,
        negated: bool,
        keysyms: &dyn KeysymTable,
    ) -> Result<(), ValueError> {
        match self {
            Slot::Boolean { field, .. } => *field.get_mut(record) = !negated,
            Slot::UnsignedInt { field, .. } => *field.get_mut(record) = parse_u32(arg)?,
            Slot::String { field, .. } => {
                let value = try_text(arg)?;
                self.dispose(record);
                *field.get_mut(record) = Some(value);
            }
            Slot::StringList { field, .. } => {
                let value = parse_list(arg)?;
                self.dispose(record);
                *field.get_mut(record) = value;
            }
            Slot::ShortcutChord { field, .. } => {
                let value = chord::parse(arg, keysyms)?;
                self.dispose(record);
                *field.get_mut(record) = value;
            }
            Slot::VtDevice { field } => {
                let value = normalize_vt(arg)?;
                self.dispose(record);
                *field.get_mut(record) = Some(value);
            }
        }
        Ok(())
    }

    /// Deep-copy the field from `src` into `dst`.
    ///
    /// Static defaults stay borrowed; owned values are duplicated. On failure
    /// `dst` is left as it was.
    pub fn copy(&self, src: &R, dst: &mut R) -> Result<(), ValueError> {
        match self {
            Slot::Boolean { field, .. } => *field.get_mut(dst) = *field.get(src),
            Slot::UnsignedInt { field, .. } => *field.get_mut(dst) = *field.get(src),
            Slot::String { field, .. } | Slot::VtDevice { field } => {
                let value = match field.get(src) {
                    Some(text) => Some(dup_text(text)?),
                    None => None,
                };
                self.dispose(dst);
                *field.get_mut(dst) = value;
            }
            Slot::StringList { field, .. } => {
                let value = dup_list(field.get(src))?;
                self.dispose(dst);
                *field.get_mut(dst) = value;
            }
            Slot::ShortcutChord { field, .. } => {
                let value = dup_chord(field.get(src))?;
                self.dispose(dst);
                *field.get_mut(dst) = value;
            }
        }
        Ok(())
    }

    /// Render the current value in the syntax [`parse`](Self::parse) accepts.
    ///
    /// Returns `None` for an unset string or device.
    pub fn render(&self, record: &R, keysyms: &dyn KeysymTable) -> Option<String> {
        match self {
            Slot::Boolean { field, .. } => Some(field.get(record).to_string()),
            Slot::UnsignedInt { field, .. } => Some(field.get(record).to_string()),
            Slot::String { field, .. } | Slot::VtDevice { field } => {
                field.get(record).as_ref().map(|t| t.to_string())
            }
            Slot::StringList { field, .. } => Some(render_list(field.get(record))),
            Slot::ShortcutChord { field, .. } => Some(chord::render(field.get(record), keysyms)),
        }
    }

    /// Render the compiled-in default without touching any record.
    pub fn render_default(&self, keysyms: &dyn KeysymTable) -> Option<String> {
        match self {
            Slot::Boolean { default, .. } => Some(default.to_string()),
            Slot::UnsignedInt { default, .. } => Some(default.to_string()),
            Slot::String { default, .. } => default.map(str::to_string),
            Slot::StringList { default, .. } => Some(render_list(default)),
            Slot::ShortcutChord { default, .. } => Some(chord::render(default, keysyms)),
            Slot::VtDevice { .. } => None,
        }
    }
}

/// Base-10 digits only; no sign, no whitespace, no radix prefix.
pub fn parse_u32(arg: &str) -> Result<u32, ValueError> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValueError::NotANumber(arg.to_string()));
    }
    arg.parse::<u32>()
        .map_err(|_| ValueError::Overflow(arg.to_string()))
}

/// Map a VT argument to a device path.
///
/// `5` becomes `/dev/tty5`, `ttyS0` becomes `/dev/ttyS0`, and anything that
/// already looks like a path (leading `/` or `.`) or is empty is kept as is.
pub fn normalize_vt(arg: &str) -> Result<Text, ValueError> {
    let path = if parse_u32(arg).is_ok() {
        // digits only, so stripping zeros gives the decimal form of the number
        let digits = match arg.trim_start_matches('0') {
            "" => "0",
            digits => digits,
        };
        let mut s = String::new();
        s.try_reserve_exact(VT_DIR.len() + VT_PREFIX.len() + digits.len())?;
        s.push_str(VT_DIR);
        s.push_str(VT_PREFIX);
        s.push_str(digits);
        s
    } else if !arg.is_empty() && !arg.starts_with('.') && !arg.starts_with('/') {
        let mut s = String::new();
        s.try_reserve_exact(VT_DIR.len() + arg.len())?;
        s.push_str(VT_DIR);
        s.push_str(arg);
        s
    } else {
        return try_text(arg);
    };
    Ok(Cow::Owned(path))
}

pub fn render_list(list: &[Text]) -> String {
    let mut out = String::new();
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            out.push(LIST_DELIMITER);
        }
        out.push_str(item);
    }
    out
}

fn parse_list(arg: &str) -> Result<TextList, ValueError> {
    let mut items: Vec<Text> = Vec::new();
    items.try_reserve_exact(arg.matches(LIST_DELIMITER).count() + 1)?;
    for part in arg.split(LIST_DELIMITER) {
        items.push(try_text(part)?);
    }
    Ok(Cow::Owned(items))
}

fn try_text(s: &str) -> Result<Text, ValueError> {
    let mut owned = String::new();
    owned.try_reserve_exact(s.len())?;
    owned.push_str(s);
    Ok(Cow::Owned(owned))
}

fn dup_text(text: &Text) -> Result<Text, ValueError> {
    match text {
        Cow::Borrowed(s) => Ok(Cow::Borrowed(s)),
        Cow::Owned(s) => try_text(s),
    }
}

fn dup_list(list: &TextList) -> Result<TextList, ValueError> {
    match list {
        Cow::Borrowed(items) => Ok(Cow::Borrowed(items)),
        Cow::Owned(items) => {
            let mut copy: Vec<Text> = Vec::new();
            copy.try_reserve_exact(items.len())?;
            for item in items {
                copy.push(dup_text(item)?);
            }
            Ok(Cow::Owned(copy))
        }
    }
}

fn dup_chord(chord: &Chord) -> Result<Chord, ValueError> {
    if !chord.is_owned() {
        return Ok(chord.clone());
    }
    let mut steps: Vec<ChordStep> = Vec::new();
    steps.try_reserve_exact(chord.steps().len())?;
    steps.extend_from_slice(chord.steps());
    Ok(Chord::from_steps(steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::{self, XkbKeysyms};
    use crate::types::Modifiers;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Rec {
        flag: bool,
        count: u32,
        name: Option<Text>,
        items: TextList,
        grab: Chord,
        vt: Option<Text>,
    }

    const ITEMS: &[Text] = &[Cow::Borrowed("seat0")];
    const SHIFT_UP: &[ChordStep] = &[ChordStep::new(Modifiers::SHIFT, keysym::UP)];

    fn slots() -> Vec<Slot<Rec>> {
        vec![
            Slot::Boolean { field: field!(Rec, flag), default: true },
            Slot::UnsignedInt { field: field!(Rec, count), default: 50 },
            Slot::String { field: field!(Rec, name), default: Some("xterm") },
            Slot::StringList { field: field!(Rec, items), default: ITEMS },
            Slot::ShortcutChord { field: field!(Rec, grab), default: Chord::from_static(SHIFT_UP) },
            Slot::VtDevice { field: field!(Rec, vt) },
        ]
    }

    fn parse(slot: &Slot<Rec>, rec: &mut Rec, arg: &str) -> Result<(), ValueError> {
        slot.parse(rec, arg, false, &XkbKeysyms)
    }

    #[test]
    fn defaults_are_installed_borrowed() {
        let mut rec = Rec::default();
        for slot in slots() {
            slot.install_default(&mut rec);
        }
        assert!(rec.flag);
        assert_eq!(rec.count, 50);
        assert!(matches!(rec.name, Some(Cow::Borrowed("xterm"))));
        assert!(matches!(rec.items, Cow::Borrowed(_)));
        assert!(!rec.grab.is_owned());
        assert_eq!(rec.vt, None);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut rec = Rec::default();
        for slot in slots() {
            slot.dispose(&mut rec);
            slot.install_default(&mut rec);
            slot.dispose(&mut rec);
            slot.dispose(&mut rec);
        }
        assert_eq!(rec.name, None);
        assert!(rec.items.is_empty());
        assert!(rec.grab.is_empty());
    }

    #[test]
    fn boolean_negation() {
        let slots = slots();
        let mut rec = Rec::default();
        slots[0].parse(&mut rec, "", true, &XkbKeysyms).unwrap();
        assert!(!rec.flag);
        slots[0].parse(&mut rec, "", false, &XkbKeysyms).unwrap();
        assert!(rec.flag);
    }

    #[test]
    fn unsigned_int_policy() {
        assert_eq!(parse_u32("0").unwrap(), 0);
        assert_eq!(parse_u32("4294967295").unwrap(), u32::MAX);
        assert!(matches!(parse_u32("4294967296"), Err(ValueError::Overflow(_))));
        assert!(matches!(parse_u32("-1"), Err(ValueError::NotANumber(_))));
        assert!(matches!(parse_u32("+1"), Err(ValueError::NotANumber(_))));
        assert!(matches!(parse_u32(" 1"), Err(ValueError::NotANumber(_))));
        assert!(matches!(parse_u32("0x10"), Err(ValueError::NotANumber(_))));
        assert!(matches!(parse_u32(""), Err(ValueError::NotANumber(_))));
    }

    #[test]
    fn failed_parse_leaves_value_untouched() {
        let slots = slots();
        let mut rec = Rec::default();
        parse(&slots[1], &mut rec, "12").unwrap();
        assert!(parse(&slots[1], &mut rec, "twelve").is_err());
        assert_eq!(rec.count, 12);

        parse(&slots[4], &mut rec, "<Alt>Left").unwrap();
        assert!(parse(&slots[4], &mut rec, "<Bogus>Up").is_err());
        assert_eq!(chord::render(&rec.grab, &XkbKeysyms), "<Alt>Left");
    }

    #[test]
    fn string_list_replaces_wholesale() {
        let slots = slots();
        let mut rec = Rec::default();
        parse(&slots[3], &mut rec, "a,b,c").unwrap();
        parse(&slots[3], &mut rec, "d").unwrap();
        assert_eq!(rec.items.len(), 1);
        assert_eq!(render_list(&rec.items), "d");
    }

    #[test]
    fn string_list_keeps_empty_entries() {
        let slots = slots();
        let mut rec = Rec::default();
        parse(&slots[3], &mut rec, "a,,b").unwrap();
        assert_eq!(rec.items.len(), 3);
        assert_eq!(rec.items[1], "");
    }

    #[test]
    fn vt_normalization() {
        assert_eq!(normalize_vt("5").unwrap(), "/dev/tty5");
        assert_eq!(normalize_vt("05").unwrap(), "/dev/tty5");
        assert_eq!(normalize_vt("0").unwrap(), "/dev/tty0");
        assert_eq!(normalize_vt("tty3").unwrap(), "/dev/tty3");
        assert_eq!(normalize_vt("/dev/tty1").unwrap(), "/dev/tty1");
        assert_eq!(normalize_vt("./vt").unwrap(), "./vt");
        assert_eq!(normalize_vt("").unwrap(), "");
    }

    #[test]
    fn copy_keeps_defaults_borrowed_and_duplicates_owned() {
        let slots = slots();
        let mut parent = Rec::default();
        let mut child = Rec::default();
        for slot in &slots {
            slot.install_default(&mut parent);
        }
        parse(&slots[2], &mut parent, "linux").unwrap();

        for slot in &slots {
            slot.copy(&parent, &mut child).unwrap();
        }
        assert!(matches!(child.name, Some(Cow::Owned(ref s)) if s == "linux"));
        assert!(matches!(child.items, Cow::Borrowed(_)));
        assert_eq!(child.count, 50);

        parse(&slots[2], &mut child, "vt100").unwrap();
        assert_eq!(parent.name.as_deref(), Some("linux"));
    }

    #[test]
    fn render_matches_parse_syntax() {
        let slots = slots();
        let mut rec = Rec::default();
        for slot in &slots {
            slot.install_default(&mut rec);
        }
        let rendered: Vec<_> = slots.iter().map(|s| s.render(&rec, &XkbKeysyms)).collect();
        assert_eq!(
            rendered,
            vec![
                Some("true".to_string()),
                Some("50".to_string()),
                Some("xterm".to_string()),
                Some("seat0".to_string()),
                Some("<Shift>Up".to_string()),
                None,
            ]
        );
    }

    proptest! {
        #[test]
        fn string_list_round_trips(items in prop::collection::vec("[a-z0-9_. -]{0,8}", 1..6)) {
            let text = items.join(",");
            let list = parse_list(&text).unwrap();
            prop_assert_eq!(render_list(&list), text);
        }
    }
}
