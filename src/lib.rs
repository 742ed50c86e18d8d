//! Declarative, layered option resolution for console daemons. Describe your
//! options once, bind them to a plain struct, and resolve them from the
//! command line and config files.
//!
//! ```ignore
//! let table = vtconf::console::options()?;
//! let mut main = Context::new(&table, ConsoleConfig::default());
//! let report = Loader::builder()
//!     .app_name("vtconf")
//!     .load_main(&mut main, &std::env::args().collect::<Vec<_>>())?;
//! if report.exit_requested {
//!     print!("{}", vtconf::help::render_usage("vtconf", &table));
//!     return Ok(());
//! }
//! ```
//!
//! That call installs the compiled defaults, applies the command line, runs
//! the aftercheck hooks, sets up logging at the selected verbosity, and
//! layers `/etc/vtconf/vtconf.conf` on top.
//!
//! # Design: the table as source of truth
//!
//! An [`OptionTable`] is an ordered list of [`Descriptor`]s. Each descriptor
//! names an option (`--font-size`, optionally `-f`), says what kind of value
//! it holds, binds it to a field of your settings struct with [`field!`], and
//! carries the compiled-in default. The same table drives:
//!
//! - the command-line scanner and the config file reader (same names),
//! - usage text ([`help::render_usage`]),
//! - listings, single-key lookups and config templates ([`ops`]).
//!
//! The table holds no per-record state. Build it once and share it between
//! the main context, every seat context, and every thread resolving one.
//!
//! # Value kinds
//!
//! The set is closed; see [`ValueKind`].
//!
//! | Kind | Field type | Input |
//! |------|------------|-------|
//! | Boolean | `bool` | `--name` / `--no-name` |
//! | UnsignedInt | `u32` | base-10 digits only; overflow is an error |
//! | String | `Option<Text>` | any text |
//! | StringList | `TextList` | comma separated, replaces the previous list |
//! | ShortcutChord | [`Chord`] | `<Control><Alt>Right`, see [`chord`] |
//! | VtDevice | `Option<Text>` | `5` is `/dev/tty5`, paths pass through |
//!
//! Reference-typed fields are `Cow`s. Defaults are borrowed from static
//! data; parsed and copied values are owned. Disposing a context releases
//! only what it owns.
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults     Descriptor default
//!        ↑ overridden by
//! Command line          argv, then every aftercheck hook
//!        ↑ overridden by
//! Config files          primary, then legacy; later lines win
//! ```
//!
//! A seat context starts from the parent's resolved values
//! ([`Context::inherit`]) and only its own `{seat}.seat.conf` is applied on
//! top. Nothing else is re-read.
//!
//! # Aftercheck hooks
//!
//! A hook runs after each pass and may read or change any field of the
//! record. The console table uses them to make `--debug` imply `--verbose`,
//! to derive `all_seats`, to reject `--session-max 0`, to request an exit for
//! `--help`, and to take the command after `--` for `--login`.
//!
//! Exactly one descriptor may be marked
//! [`consumes_trailing`](Descriptor::consumes_trailing). Only its hook may
//! claim the arguments after `--`; a second consumer is rejected when the
//! table is built, and arguments nobody claims are an error.
//!
//! # Error handling
//!
//! All fallible operations return [`ConfError`]. The first error aborts the
//! current pass; options applied earlier in the same pass stay applied.
//! File errors carry the path and line number. A config file that exists but
//! cannot be read is reported in the [`LoadReport`] instead of aborting.

pub mod chord;
pub mod console;
pub mod error;
pub mod help;
pub mod keysym;
pub mod kind;
pub mod logging;
pub mod ops;
pub mod types;

mod argv;
mod builder;
mod context;
mod file;
mod table;

#[cfg(test)]
mod fixtures;

pub use builder::{LoadReport, LogSink, Loader};
pub use context::Context;
pub use error::{ConfError, ValueError};
pub use kind::{Field, Slot, ValueKind};
pub use ops::ConfigResult;
pub use table::{AfterCheck, AfterCheckFn, Descriptor, InheritFn, OptionTable, TableBuilder};
pub use types::{Chord, ChordStep, FileStatus, Keysym, Modifiers, Outcome, Text, TextList};
