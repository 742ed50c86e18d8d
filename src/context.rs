//! Resolution contexts: one option table bound to one settings record.
//!
//! A top-level resolution runs these steps in order:
//!
//! 1. [`Context::new`] installs every default.
//! 2. [`Context::parse_argv`] applies the command line, then runs every
//!    aftercheck hook in table order. If a hook requested an exit the caller
//!    gets [`Outcome::Exit`] and should stop.
//! 3. [`Context::parse_file`] applies one config file (repeatable), then runs
//!    the hooks of the options that file touched.
//!
//! A seat context skips 1-2: [`Context::inherit`] copies every resolved value
//! from a parent, and only the seat's own file is parsed on top.
//!
//! Each context owns its record, so independent contexts can be resolved on
//! different threads while sharing one table.

use std::path::Path;

use tracing::debug;

use crate::argv;
use crate::error::ConfError;
use crate::file;
use crate::table::{AfterCheck, OptionTable};
use crate::types::{FileStatus, Outcome};

pub struct Context<'t, R> {
    table: &'t OptionTable<R>,
    record: R,
    env_vars: Vec<(String, String)>,
}

impl<'t, R> Context<'t, R> {
    /// Bind `record` to `table` and install every default.
    ///
    /// The process environment is captured now (variables that are not valid
    /// UTF-8 are skipped); see
    /// [`with_env_vars`](Self::with_env_vars) to supply synthetic values.
    pub fn new(table: &'t OptionTable<R>, mut record: R) -> Self {
        for d in table.descriptors() {
            d.slot().install_default(&mut record);
        }
        Self {
            table,
            record,
            env_vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Replace the environment snapshot hooks read from.
    pub fn with_env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env_vars = vars.into_iter().collect();
        self
    }

    pub fn table(&self) -> &'t OptionTable<R> {
        self.table
    }

    pub fn settings(&self) -> &R {
        &self.record
    }

    pub fn into_settings(self) -> R {
        self.record
    }

    /// Parse the command line (`argv[0]` is the program name) and run the
    /// aftercheck pass.
    pub fn parse_argv<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<Outcome, ConfError> {
        let argv: Vec<String> = argv.iter().map(|s| s.as_ref().to_string()).collect();
        let trailing = argv::scan(self.table, &mut self.record, &argv)?;

        let all: Vec<usize> = (0..self.table.len()).collect();
        let outcome = self.run_after_checks(&all, &argv, trailing)?;
        if outcome == Outcome::Exit {
            debug!("exit requested on the command line");
        }
        Ok(outcome)
    }

    /// Parse one config file. A missing file is skipped.
    pub fn parse_file(&mut self, path: &Path) -> Result<FileStatus, ConfError> {
        let Some(bytes) = file::read_optional(path)? else {
            debug!(path = %path.display(), "config file not present");
            return Ok(FileStatus::Missing);
        };
        let (content, bad_line) = file::decode(bytes);
        let applied = self.parse_str(path, &content)?;
        if let Some(line) = bad_line {
            return Err(ConfError::Syntax {
                path: path.to_path_buf(),
                line,
                message: "line is not valid UTF-8".into(),
            });
        }
        debug!(path = %path.display(), options = applied, "parsed config file");
        Ok(FileStatus::Loaded { options: applied })
    }

    /// Apply config file content that was already read. `path` is only used
    /// in diagnostics. Returns the number of option lines applied.
    pub fn parse_str(&mut self, path: &Path, content: &str) -> Result<usize, ConfError> {
        let entries = file::entries(content, path)?;
        let mut touched: Vec<usize> = Vec::new();

        for entry in &entries {
            let in_file = |source: ConfError| ConfError::InFile {
                path: path.to_path_buf(),
                line: entry.line,
                source: Box::new(source),
            };
            let (idx, negated) = self.table.resolve_long(entry.name).map_err(in_file)?;
            let descriptor = &self.table.descriptors()[idx];

            let value = match (descriptor.slot().kind().takes_argument(), entry.value) {
                (true, Some(v)) => v,
                (true, None) => {
                    return Err(in_file(ConfError::MissingArgument {
                        name: descriptor.long().to_string(),
                    }));
                }
                (false, Some(_)) => {
                    return Err(in_file(ConfError::UnexpectedArgument {
                        name: descriptor.long().to_string(),
                    }));
                }
                (false, None) => "",
            };
            argv::apply(self.table, &mut self.record, idx, value, negated).map_err(in_file)?;

            if !touched.contains(&idx) {
                touched.push(idx);
            }
        }

        touched.sort_unstable();
        self.run_after_checks(&touched, &[], None)?;
        Ok(entries.len())
    }

    /// Copy every resolved value from `parent` into this context.
    ///
    /// Defaults and command-line parsing are not re-run; the child starts out
    /// equal to the parent and diverges only through later file passes.
    pub fn inherit(&mut self, parent: &Context<'_, R>) -> Result<(), ConfError> {
        for d in self.table.descriptors() {
            d.slot()
                .copy(&parent.record, &mut self.record)
                .map_err(|e| ConfError::invalid_value(d.long(), e))?;
        }
        if let Some(hook) = self.table.inherit_hook() {
            hook(&parent.record, &mut self.record);
        }
        debug!("inherited parent configuration");
        Ok(())
    }

    /// Release every owned value, leaving each option empty.
    pub fn dispose(&mut self) {
        for d in self.table.descriptors() {
            d.slot().dispose(&mut self.record);
        }
    }

    fn run_after_checks(
        &mut self,
        indices: &[usize],
        argv: &[String],
        trailing: Option<usize>,
    ) -> Result<Outcome, ConfError> {
        let mut claimed = false;
        let mut exit = false;

        for &idx in indices {
            let descriptor = &self.table.descriptors()[idx];
            let Some(hook) = descriptor.hook() else {
                continue;
            };
            let mut ctx = AfterCheck {
                option: descriptor.long(),
                argv,
                trailing,
                may_claim: descriptor.is_trailing_consumer(),
                claimed: &mut claimed,
                exit: &mut exit,
                env: &self.env_vars,
            };
            hook(&mut self.record, &mut ctx)?;
        }

        if exit {
            return Ok(Outcome::Exit);
        }
        if let Some(idx) = trailing
            && !claimed
            && let Some(first) = argv.get(idx)
        {
            return Err(ConfError::UnclaimedTrailing(first.clone()));
        }
        Ok(Outcome::Continue)
    }
}
