//! Option descriptor table.
//!
//! A [`Descriptor`] binds a long name (and optionally a short one) to a
//! [`Slot`] of a settings record and, optionally, an aftercheck hook. An
//! [`OptionTable`] is the ordered, validated set of descriptors for one record
//! type. It holds no per-record state, so one table serves the main context
//! and every seat context, from any number of threads.
//!
//! # Aftercheck hooks
//!
//! Hooks run after a parse pass, in table order. They receive the whole
//! record, so a hook may derive or validate fields it is not bound to (a
//! `debug` flag forcing `verbose`, say). They see the pass through an
//! [`AfterCheck`]:
//!
//! - the argument vector and the index of the first token after `--`,
//! - [`claim_trailing`](AfterCheck::claim_trailing), which only the one
//!   descriptor marked [`consumes_trailing`](Descriptor::consumes_trailing)
//!   may call, and only once per pass,
//! - [`request_exit`](AfterCheck::request_exit), the early-exit signal,
//! - a snapshot of the process environment.

use std::collections::HashSet;

use crate::error::ConfError;
use crate::keysym::{KeysymTable, XkbKeysyms};
use crate::kind::{Field, Slot};
use crate::types::{Chord, Text, TextList};

/// Aftercheck hook signature.
pub type AfterCheckFn<R> = fn(&mut R, &mut AfterCheck<'_>) -> Result<(), ConfError>;

/// Copies derived (non-option) fields when a context inherits from another.
pub type InheritFn<R> = fn(&R, &mut R);

/// One named option.
pub struct Descriptor<R> {
    short: Option<char>,
    long: &'static str,
    slot: Slot<R>,
    after_check: Option<AfterCheckFn<R>>,
    consumes_trailing: bool,
    doc: &'static str,
}

impl<R> Descriptor<R> {
    pub fn new(short: Option<char>, long: &'static str, slot: Slot<R>) -> Self {
        Self {
            short,
            long,
            slot,
            after_check: None,
            consumes_trailing: false,
            doc: "",
        }
    }

    pub fn boolean(short: Option<char>, long: &'static str, field: Field<R, bool>, default: bool) -> Self {
        Self::new(short, long, Slot::Boolean { field, default })
    }

    pub fn uint(short: Option<char>, long: &'static str, field: Field<R, u32>, default: u32) -> Self {
        Self::new(short, long, Slot::UnsignedInt { field, default })
    }

    pub fn string(
        short: Option<char>,
        long: &'static str,
        field: Field<R, Option<Text>>,
        default: Option<&'static str>,
    ) -> Self {
        Self::new(short, long, Slot::String { field, default })
    }

    pub fn string_list(
        short: Option<char>,
        long: &'static str,
        field: Field<R, TextList>,
        default: &'static [Text],
    ) -> Self {
        Self::new(short, long, Slot::StringList { field, default })
    }

    pub fn chord(short: Option<char>, long: &'static str, field: Field<R, Chord>, default: Chord) -> Self {
        Self::new(short, long, Slot::ShortcutChord { field, default })
    }

    pub fn vt(short: Option<char>, long: &'static str, field: Field<R, Option<Text>>) -> Self {
        Self::new(short, long, Slot::VtDevice { field })
    }

    /// Attach a hook that runs after every pass that touched this option
    /// (and after every command-line pass).
    pub fn after_check(mut self, hook: AfterCheckFn<R>) -> Self {
        self.after_check = Some(hook);
        self
    }

    /// Designate this option's hook as the consumer of trailing arguments.
    pub fn consumes_trailing(mut self) -> Self {
        self.consumes_trailing = true;
        self
    }

    /// One-line description for usage text and templates.
    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn long(&self) -> &'static str {
        self.long
    }

    pub fn slot(&self) -> &Slot<R> {
        &self.slot
    }

    pub fn hook(&self) -> Option<AfterCheckFn<R>> {
        self.after_check
    }

    pub fn is_trailing_consumer(&self) -> bool {
        self.consumes_trailing
    }

    pub fn description(&self) -> &'static str {
        self.doc
    }

    /// Only booleans accept the `no-` prefix.
    pub fn negatable(&self) -> bool {
        !self.slot.kind().takes_argument()
    }
}

/// The validated, ordered set of descriptors for a record type `R`.
pub struct OptionTable<R> {
    descriptors: Vec<Descriptor<R>>,
    sections: Vec<(usize, &'static str)>,
    keysyms: Box<dyn KeysymTable>,
    inherit: Option<InheritFn<R>>,
}

impl<R> OptionTable<R> {
    pub fn builder() -> TableBuilder<R> {
        TableBuilder {
            descriptors: Vec::new(),
            sections: Vec::new(),
            keysyms: None,
            inherit: None,
        }
    }

    pub fn descriptors(&self) -> &[Descriptor<R>] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Section headings as `(index of first descriptor, title)`.
    pub fn sections(&self) -> &[(usize, &'static str)] {
        &self.sections
    }

    pub fn keysyms(&self) -> &dyn KeysymTable {
        self.keysyms.as_ref()
    }

    pub(crate) fn inherit_hook(&self) -> Option<InheritFn<R>> {
        self.inherit
    }

    pub fn find_long(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.long == name)
    }

    pub fn find_short(&self, c: char) -> Option<usize> {
        self.descriptors.iter().position(|d| d.short == Some(c))
    }

    /// Resolve a long name that may carry the `no-` prefix.
    ///
    /// An exact match wins over a negated one, so an option really named
    /// `no-foo` stays reachable.
    pub fn resolve_long(&self, name: &str) -> Result<(usize, bool), ConfError> {
        if let Some(idx) = self.find_long(name) {
            return Ok((idx, false));
        }
        if let Some(base) = name.strip_prefix("no-")
            && let Some(idx) = self.find_long(base)
        {
            if !self.descriptors[idx].negatable() {
                return Err(ConfError::NotNegatable {
                    name: base.to_string(),
                });
            }
            return Ok((idx, true));
        }
        Err(ConfError::UnknownOption(name.to_string()))
    }
}

/// Builder for [`OptionTable`]. Validation happens in [`build`](Self::build).
pub struct TableBuilder<R> {
    descriptors: Vec<Descriptor<R>>,
    sections: Vec<(usize, &'static str)>,
    keysyms: Option<Box<dyn KeysymTable>>,
    inherit: Option<InheritFn<R>>,
}

impl<R> TableBuilder<R> {
    pub fn option(mut self, descriptor: Descriptor<R>) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Start a titled group; the following options belong to it.
    pub fn section(mut self, title: &'static str) -> Self {
        self.sections.push((self.descriptors.len(), title));
        self
    }

    /// Replace the built-in keysym table used for shortcut options.
    ///
    /// Parsing, usage text and the [`ops`](crate::ops) listings use it.
    /// `Chord`'s own `Display` and `Serialize` keep the built-in names.
    pub fn keysyms(mut self, table: impl KeysymTable + 'static) -> Self {
        self.keysyms = Some(Box::new(table));
        self
    }

    /// Copy derived fields on inheritance; see [`Context::inherit`](crate::Context::inherit).
    pub fn on_inherit(mut self, hook: InheritFn<R>) -> Self {
        self.inherit = Some(hook);
        self
    }

    /// Validate and freeze the table.
    ///
    /// Fails on an empty or duplicate long name, a duplicate short name, or
    /// more than one trailing-argument consumer.
    pub fn build(self) -> Result<OptionTable<R>, ConfError> {
        let mut longs = HashSet::new();
        let mut shorts = HashSet::new();
        let mut consumer: Option<&'static str> = None;

        for d in &self.descriptors {
            if d.long.is_empty() || !longs.insert(d.long) {
                return Err(ConfError::DuplicateName(d.long.to_string()));
            }
            if let Some(c) = d.short
                && !shorts.insert(c)
            {
                return Err(ConfError::DuplicateShortName(c));
            }
            if d.consumes_trailing {
                if let Some(first) = consumer {
                    return Err(ConfError::MultipleTrailingConsumers {
                        first: first.to_string(),
                        second: d.long.to_string(),
                    });
                }
                consumer = Some(d.long);
            }
        }

        Ok(OptionTable {
            descriptors: self.descriptors,
            sections: self.sections,
            keysyms: self.keysyms.unwrap_or_else(|| Box::new(XkbKeysyms)),
            inherit: self.inherit,
        })
    }
}

/// What a hook can see and do during an aftercheck pass.
pub struct AfterCheck<'a> {
    pub(crate) option: &'static str,
    pub(crate) argv: &'a [String],
    pub(crate) trailing: Option<usize>,
    pub(crate) may_claim: bool,
    pub(crate) claimed: &'a mut bool,
    pub(crate) exit: &'a mut bool,
    pub(crate) env: &'a [(String, String)],
}

impl<'a> AfterCheck<'a> {
    /// Take ownership of the trailing arguments (possibly empty).
    ///
    /// Only the designated consumer may claim, once per pass.
    pub fn claim_trailing(&mut self) -> Result<&'a [String], ConfError> {
        if !self.may_claim {
            return Err(ConfError::TrailingNotDesignated(self.option.to_string()));
        }
        if *self.claimed {
            return Err(ConfError::TrailingAlreadyClaimed);
        }
        *self.claimed = true;
        Ok(match self.trailing {
            Some(idx) => &self.argv[idx.min(self.argv.len())..],
            None => &[],
        })
    }

    /// Ask the caller to stop after this pass.
    pub fn request_exit(&mut self) {
        *self.exit = true;
    }

    /// Look up a variable in the environment snapshot.
    pub fn env_var(&self, name: &str) -> Option<&'a str> {
        self.env
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;
    use crate::fixtures::test::{TestRecord, test_table};

    #[test]
    fn fixture_table_builds() {
        let table = test_table().unwrap();
        assert!(table.find_long("verbose").is_some());
        assert_eq!(table.find_short('v'), table.find_long("verbose"));
    }

    #[test]
    fn duplicate_long_name_fails_fast() {
        let result = OptionTable::builder()
            .option(Descriptor::boolean(None, "verbose", field!(TestRecord, verbose), false))
            .option(Descriptor::boolean(None, "verbose", field!(TestRecord, debug), false))
            .build();
        assert!(matches!(result, Err(ConfError::DuplicateName(name)) if name == "verbose"));
    }

    #[test]
    fn duplicate_short_name_fails_fast() {
        let result = OptionTable::builder()
            .option(Descriptor::boolean(Some('v'), "verbose", field!(TestRecord, verbose), false))
            .option(Descriptor::boolean(Some('v'), "debug", field!(TestRecord, debug), false))
            .build();
        assert!(matches!(result, Err(ConfError::DuplicateShortName('v'))));
    }

    #[test]
    fn empty_long_name_rejected() {
        let result = OptionTable::builder()
            .option(Descriptor::boolean(None, "", field!(TestRecord, verbose), false))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn second_trailing_consumer_rejected() {
        let result = OptionTable::builder()
            .option(Descriptor::boolean(None, "verbose", field!(TestRecord, verbose), false).consumes_trailing())
            .option(Descriptor::boolean(None, "debug", field!(TestRecord, debug), false).consumes_trailing())
            .build();
        assert!(matches!(
            result,
            Err(ConfError::MultipleTrailingConsumers { first, second }) if first == "verbose" && second == "debug"
        ));
    }

    #[test]
    fn negated_names_resolve_for_booleans_only() {
        let table = test_table().unwrap();
        let verbose = table.find_long("verbose").unwrap();
        assert_eq!(table.resolve_long("no-verbose").unwrap(), (verbose, true));
        assert_eq!(table.resolve_long("verbose").unwrap(), (verbose, false));
        assert!(matches!(table.resolve_long("no-count"), Err(ConfError::NotNegatable { .. })));
        assert!(matches!(table.resolve_long("bogus"), Err(ConfError::UnknownOption(_))));
    }

    fn after_check<'a>(
        argv: &'a [String],
        trailing: Option<usize>,
        may_claim: bool,
        claimed: &'a mut bool,
        exit: &'a mut bool,
    ) -> AfterCheck<'a> {
        AfterCheck {
            option: "run",
            argv,
            trailing,
            may_claim,
            claimed,
            exit,
            env: &[],
        }
    }

    #[test]
    fn only_designated_hook_may_claim() {
        let argv: Vec<String> = vec!["prog".into(), "--".into(), "ls".into()];
        let (mut claimed, mut exit) = (false, false);
        let mut ac = after_check(&argv, Some(2), false, &mut claimed, &mut exit);
        assert!(matches!(ac.claim_trailing(), Err(ConfError::TrailingNotDesignated(_))));
    }

    #[test]
    fn claim_is_single_use() {
        let argv: Vec<String> = vec!["prog".into(), "--".into(), "ls".into()];
        let (mut claimed, mut exit) = (false, false);
        let mut ac = after_check(&argv, Some(2), true, &mut claimed, &mut exit);
        assert_eq!(ac.claim_trailing().unwrap(), &["ls".to_string()]);
        assert!(matches!(ac.claim_trailing(), Err(ConfError::TrailingAlreadyClaimed)));
    }

    #[test]
    fn claim_without_terminator_is_empty() {
        let argv: Vec<String> = vec!["prog".into()];
        let (mut claimed, mut exit) = (false, false);
        let mut ac = after_check(&argv, None, true, &mut claimed, &mut exit);
        assert!(ac.claim_trailing().unwrap().is_empty());
    }
}
