#[cfg(test)]
pub mod test {
    use std::borrow::Cow;

    use crate::error::ConfError;
    use crate::field;
    use crate::keysym;
    use crate::table::{AfterCheck, Descriptor, OptionTable};
    use crate::types::{Chord, ChordStep, Modifiers, Text, TextList};

    /// A small record exercising every value kind.
    #[derive(Debug, Default)]
    pub struct TestRecord {
        pub help: bool,
        pub verbose: bool,
        pub debug: bool,
        pub count: u32,
        pub name: Option<Text>,
        pub items: TextList,
        pub grab: Chord,
        pub vt: Option<Text>,
        pub run: bool,

        pub exit: bool,
        pub command: Vec<String>,
        pub debug_hook_runs: u32,
    }

    const ITEMS: &[Text] = &[Cow::Borrowed("one"), Cow::Borrowed("two")];
    const GRAB: &[ChordStep] = &[ChordStep::new(Modifiers::SHIFT, keysym::UP)];

    fn help_hook(rec: &mut TestRecord, ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
        if rec.help {
            rec.exit = true;
            ctx.request_exit();
        }
        Ok(())
    }

    fn debug_hook(rec: &mut TestRecord, _ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
        rec.debug_hook_runs += 1;
        if rec.debug {
            rec.verbose = true;
        }
        Ok(())
    }

    fn run_hook(rec: &mut TestRecord, ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
        if rec.run {
            let rest = ctx.claim_trailing()?;
            if rest.is_empty() {
                return Err(ConfError::Usage("Arguments for --run missing".into()));
            }
            rec.command = rest.to_vec();
        } else {
            rec.command = vec![ctx.env_var("SHELL").unwrap_or("/bin/sh").to_string()];
        }
        Ok(())
    }

    pub fn test_table() -> Result<OptionTable<TestRecord>, ConfError> {
        OptionTable::builder()
            .section("General")
            .option(
                Descriptor::boolean(Some('h'), "help", field!(TestRecord, help), false)
                    .after_check(help_hook)
                    .doc("Print help and exit"),
            )
            .option(
                Descriptor::boolean(Some('v'), "verbose", field!(TestRecord, verbose), false)
                    .after_check(debug_hook)
                    .doc("Verbose output"),
            )
            .option(
                Descriptor::boolean(None, "debug", field!(TestRecord, debug), false)
                    .after_check(debug_hook),
            )
            .section("Values")
            .option(Descriptor::uint(Some('c'), "count", field!(TestRecord, count), 7))
            .option(Descriptor::string(Some('n'), "name", field!(TestRecord, name), Some("fixture")))
            .option(Descriptor::string_list(None, "items", field!(TestRecord, items), ITEMS))
            .option(Descriptor::chord(None, "grab", field!(TestRecord, grab), Chord::from_static(GRAB)))
            .option(Descriptor::vt(None, "vt", field!(TestRecord, vt)))
            .option(
                Descriptor::boolean(Some('r'), "run", field!(TestRecord, run), false)
                    .after_check(run_hook)
                    .consumes_trailing(),
            )
            .on_inherit(|src, dst| dst.command = src.command.clone())
            .build()
    }
}
