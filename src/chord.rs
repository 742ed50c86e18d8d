//! Shortcut-chord grammar.
//!
//! A shortcut is one or more steps written back to back. Each step is zero or
//! more modifier tags in angle brackets followed by a key symbol name:
//!
//! ```text
//! <Shift>Up                 one step, Shift + Up
//! <Control><Alt>Right       one step, Control + Alt + Right
//! <Control>x<Control>c      two steps
//! <Control>x,c              two steps, the second without modifiers
//! ```
//!
//! A symbol name ends at `<`, `,` or whitespace. Modifier tags are matched
//! case-insensitively (`Ctrl` is accepted for `Control`); symbol names are
//! resolved case-sensitively through a [`KeysymTable`].

use crate::error::ValueError;
use crate::keysym::KeysymTable;
use crate::types::{Chord, ChordStep, Modifiers};

const MODIFIER_TAGS: &[(&str, Modifiers)] = &[
    ("Shift", Modifiers::SHIFT),
    ("Control", Modifiers::CONTROL),
    ("Ctrl", Modifiers::CONTROL),
    ("Alt", Modifiers::ALT),
    ("Logo", Modifiers::LOGO),
];

fn modifier(tag: &str) -> Option<Modifiers> {
    MODIFIER_TAGS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(tag))
        .map(|(_, m)| *m)
}

/// Parse a shortcut specification into an owned [`Chord`].
pub fn parse(text: &str, keysyms: &dyn KeysymTable) -> Result<Chord, ValueError> {
    let mut steps: Vec<ChordStep> = Vec::new();
    let mut mods = Modifiers::empty();
    let mut rest = text.trim_start();
    // A step is open once a modifier was read or a separator demands a symbol.
    let mut pending = true;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            let end = after
                .find('>')
                .ok_or_else(|| ValueError::UnterminatedModifier(text.to_string()))?;
            let tag = &after[..end];
            mods |= modifier(tag).ok_or_else(|| ValueError::UnknownModifier(tag.to_string()))?;
            rest = after[end + 1..].trim_start();
            pending = true;
            continue;
        }

        if let Some(after) = rest.strip_prefix(',') {
            if pending {
                return Err(ValueError::EmptySymbol);
            }
            rest = after.trim_start();
            pending = true;
            continue;
        }

        let end = rest
            .find(|c: char| c == '<' || c == ',' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..end];
        if !pending {
            return Err(ValueError::MissingSeparator);
        }
        let sym = keysyms
            .lookup(name)
            .ok_or_else(|| ValueError::UnknownSymbol(name.to_string()))?;

        steps.try_reserve(1)?;
        steps.push(ChordStep::new(mods, sym));
        mods = Modifiers::empty();
        pending = false;
        rest = rest[end..].trim_start();
    }

    if pending {
        return Err(ValueError::EmptySymbol);
    }
    Ok(Chord::from_steps(steps))
}

/// Render a chord in the canonical form accepted by [`parse`].
///
/// Symbols the table cannot name are written as hex (`0x1008ff13`), which
/// will not parse back.
pub fn render(chord: &Chord, keysyms: &dyn KeysymTable) -> String {
    let mut out = String::new();
    for (i, step) in chord.steps().iter().enumerate() {
        if i > 0 && step.mods.is_empty() {
            out.push(',');
        }
        for (name, flag) in MODIFIER_TAGS {
            // Ctrl is an input alias only.
            if *name != "Ctrl" && step.mods.contains(*flag) {
                out.push('<');
                out.push_str(name);
                out.push('>');
            }
        }
        match keysyms.name(step.sym) {
            Some(name) => out.push_str(&name),
            None => out.push_str(&format!("{:#x}", step.sym.0)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::{self, XkbKeysyms};
    use crate::types::Keysym;
    use proptest::prelude::*;

    fn p(text: &str) -> Result<Chord, ValueError> {
        parse(text, &XkbKeysyms)
    }

    #[test]
    fn shift_up_is_one_step() {
        let chord = p("<Shift>Up").unwrap();
        assert_eq!(chord.steps(), &[ChordStep::new(Modifiers::SHIFT, keysym::UP)]);
    }

    #[test]
    fn control_alt_right_sets_both_modifiers() {
        let chord = p("<Control><Alt>Right").unwrap();
        assert_eq!(chord.steps().len(), 1);
        assert_eq!(chord.steps()[0].mods, Modifiers::CONTROL | Modifiers::ALT);
        assert_eq!(chord.steps()[0].sym, keysym::RIGHT);
    }

    #[test]
    fn ctrl_alias_and_case_insensitive_tags() {
        let a = p("<Ctrl><alt>Return").unwrap();
        let b = p("<Control><Alt>Return").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bogus_modifier_is_rejected() {
        assert!(matches!(p("<Bogus>Up"), Err(ValueError::UnknownModifier(tag)) if tag == "Bogus"));
    }

    #[test]
    fn unresolvable_symbol_is_rejected() {
        assert!(matches!(p("<Shift>NoSuchKey"), Err(ValueError::UnknownSymbol(_))));
        assert!(matches!(p("<Shift>up"), Err(ValueError::UnknownSymbol(_))));
        assert!(matches!(p("F+1"), Err(ValueError::UnknownSymbol(_))));
    }

    #[test]
    fn missing_symbol_is_rejected() {
        assert!(matches!(p(""), Err(ValueError::EmptySymbol)));
        assert!(matches!(p("<Shift>"), Err(ValueError::EmptySymbol)));
        assert!(matches!(p("<Shift>Up,"), Err(ValueError::EmptySymbol)));
        assert!(matches!(p(",Up"), Err(ValueError::EmptySymbol)));
    }

    #[test]
    fn unterminated_tag_is_rejected() {
        assert!(matches!(p("<Shift Up"), Err(ValueError::UnterminatedModifier(_))));
    }

    #[test]
    fn multi_step_sequences() {
        let chord = p("<Control>x<Control>c").unwrap();
        assert_eq!(chord.steps().len(), 2);
        assert_eq!(chord.steps()[1].sym, Keysym('c' as u32));

        let chord = p("<Control>x,c").unwrap();
        assert_eq!(chord.steps().len(), 2);
        assert!(chord.steps()[1].mods.is_empty());
    }

    #[test]
    fn bare_symbol_after_step_needs_separator() {
        assert!(matches!(p("<Shift>Up Down"), Err(ValueError::MissingSeparator)));
        assert!(p("<Shift>Up, Down").is_ok());
    }

    #[test]
    fn parsed_chord_is_owned() {
        assert!(p("a").unwrap().is_owned());
    }

    #[test]
    fn render_is_canonical() {
        let chord = p("<alt><ctrl>Page_Up").unwrap();
        assert_eq!(render(&chord, &XkbKeysyms), "<Control><Alt>Prior");
    }

    #[test]
    fn render_separates_plain_steps() {
        let chord = p("<Logo>a , b<Shift>c").unwrap();
        assert_eq!(render(&chord, &XkbKeysyms), "<Logo>a,b<Shift>c");
    }

    fn step_strategy() -> impl Strategy<Value = (u8, &'static str)> {
        let names = prop::sample::select(vec!["Up", "Down", "Prior", "Return", "w", "Q", "F7", "space"]);
        (0u8..16, names)
    }

    proptest! {
        #[test]
        fn canonical_text_round_trips(steps in prop::collection::vec(step_strategy(), 1..5)) {
            let mut text = String::new();
            for (i, (bits, name)) in steps.iter().enumerate() {
                let mut tags = String::new();
                for (bit, tag) in ["Shift", "Control", "Alt", "Logo"].iter().enumerate() {
                    if bits & (1 << bit) != 0 {
                        tags.push_str(&format!("<{tag}>"));
                    }
                }
                if i > 0 && tags.is_empty() {
                    text.push(',');
                }
                text.push_str(&tags);
                text.push_str(name);
            }
            let chord = parse(&text, &XkbKeysyms).unwrap();
            prop_assert_eq!(render(&chord, &XkbKeysyms), text);
        }
    }
}
