use std::borrow::Cow;
use std::fmt;

use bitflags::bitflags;
use serde::{Serialize, Serializer};

/// Text owned by a settings record.
///
/// `Borrowed` values are compiled-in defaults and are never freed; `Owned`
/// values came from a parse or a copy and belong to the record.
pub type Text = Cow<'static, str>;

/// An ordered list of [`Text`]. The static default list is `Borrowed`.
pub type TextList = Cow<'static, [Text]>;

bitflags! {
    /// Modifier keys that must be held for one chord step.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
        const LOGO = 1 << 4;
    }
}

/// A key symbol identifier as defined by the keysym table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keysym(pub u32);

/// One step of a shortcut: a modifier mask plus a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChordStep {
    pub mods: Modifiers,
    pub sym: Keysym,
}

impl ChordStep {
    pub const fn new(mods: Modifiers, sym: Keysym) -> Self {
        Self { mods, sym }
    }
}

/// An ordered sequence of chord steps. More than one step means each key is
/// pressed in turn.
///
/// Compiled-in defaults are built with [`Chord::from_static`] and never own
/// heap memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord(pub(crate) Cow<'static, [ChordStep]>);

impl Chord {
    /// The never-populated chord.
    pub const EMPTY: Chord = Chord(Cow::Borrowed(&[]));

    pub const fn from_static(steps: &'static [ChordStep]) -> Self {
        Chord(Cow::Borrowed(steps))
    }

    pub fn from_steps(steps: Vec<ChordStep>) -> Self {
        Chord(Cow::Owned(steps))
    }

    pub fn steps(&self) -> &[ChordStep] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this value owns heap memory (as opposed to a static default).
    pub fn is_owned(&self) -> bool {
        matches!(self.0, Cow::Owned(_))
    }
}

impl Default for Chord {
    fn default() -> Self {
        Chord::EMPTY
    }
}

/// Renders with the built-in X keysym names. A table with its own
/// [`KeysymTable`](crate::keysym::KeysymTable) should go through
/// [`chord::render`](crate::chord::render) or the [`ops`](crate::ops) listing
/// instead, which use the table's names.
impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::chord::render(self, &crate::keysym::XkbKeysyms))
    }
}

/// Same text as [`Display`](fmt::Display), so the built-in names.
impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What the caller should do after the command-line pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep going: read configuration files and start up.
    Continue,
    /// A hook asked to stop (e.g. `--help`); skip everything else.
    Exit,
}

/// Result of a file pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The file does not exist. Not an error.
    Missing,
    /// The file was parsed; `options` lines were applied.
    Loaded { options: usize },
}
