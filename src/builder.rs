use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::ConfError;
use crate::file;
use crate::logging::{self, LogConfig, LogSettings};
use crate::types::{FileStatus, Outcome};

const SYSTEM_CONFIG_ROOT: &str = "/etc";

/// Receives the verbosity selected by the command line.
pub type LogSink = Box<dyn Fn(&LogConfig) -> Result<(), ConfError> + Send + Sync>;

/// Builder for locating and loading configuration files.
///
/// Derived from [`app_name`](Self::app_name):
///
/// - primary file: `/etc/{app}/{app}.conf`
/// - legacy file: `/etc/{app}.conf` (read with a deprecation warning)
/// - per-seat file: `/etc/{app}/{seat}.seat.conf`
pub struct Loader {
    app_name: Option<String>,
    config_dir: Option<PathBuf>,
    legacy_file: Option<PathBuf>,
    legacy_enabled: bool,
    log_sink: Option<LogSink>,
}

impl Loader {
    pub fn builder() -> Self {
        Self {
            app_name: None,
            config_dir: None,
            legacy_file: None,
            legacy_enabled: true,
            log_sink: Some(Box::new(stderr_sink)),
        }
    }

    /// Set the application name. This derives the directory and file names
    /// of every config file.
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the config directory (default: `/etc/{app_name}`).
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Override the legacy file (default: `/etc/{app_name}.conf`).
    pub fn legacy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy_file = Some(path.into());
        self
    }

    /// Do not look for the legacy file at all.
    pub fn no_legacy(mut self) -> Self {
        self.legacy_enabled = false;
        self
    }

    /// Replace the default sink, which installs a stderr subscriber.
    pub fn log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&LogConfig) -> Result<(), ConfError> + Send + Sync + 'static,
    {
        self.log_sink = Some(Box::new(sink));
        self
    }

    /// Leave logging setup to the caller.
    pub fn no_logging(mut self) -> Self {
        self.log_sink = None;
        self
    }

    fn effective_app_name(&self) -> Result<&str, ConfError> {
        self.app_name.as_deref().ok_or(ConfError::AppNameRequired)
    }

    fn effective_config_dir(&self) -> Result<PathBuf, ConfError> {
        if let Some(dir) = &self.config_dir {
            return Ok(dir.clone());
        }
        let app = self.effective_app_name()?;
        Ok(Path::new(SYSTEM_CONFIG_ROOT).join(app))
    }

    /// Path of the main config file.
    pub fn primary_path(&self) -> Result<PathBuf, ConfError> {
        let app = self.effective_app_name()?;
        Ok(self.effective_config_dir()?.join(format!("{app}.conf")))
    }

    /// Path of the deprecated config file, if enabled.
    pub fn legacy_path(&self) -> Result<Option<PathBuf>, ConfError> {
        if !self.legacy_enabled {
            return Ok(None);
        }
        if let Some(path) = &self.legacy_file {
            return Ok(Some(path.clone()));
        }
        let app = self.effective_app_name()?;
        Ok(Some(Path::new(SYSTEM_CONFIG_ROOT).join(format!("{app}.conf"))))
    }

    /// Path of the config file for `seat`.
    pub fn seat_path(&self, seat: &str) -> Result<PathBuf, ConfError> {
        Ok(file::seat_file(&self.effective_config_dir()?, seat))
    }

    /// Resolve the main context: command line, log hand-off, then the primary
    /// and legacy files.
    ///
    /// Stops right after the command line if a hook requested an exit.
    /// Files that exist but cannot be read are collected in the report and
    /// do not abort loading.
    pub fn load_main<R, S>(&self, ctx: &mut Context<'_, R>, argv: &[S]) -> Result<LoadReport, ConfError>
    where
        R: LogSettings,
        S: AsRef<str>,
    {
        let mut report = LoadReport::default();

        if ctx.parse_argv(argv)? == Outcome::Exit {
            report.exit_requested = true;
            return Ok(report);
        }

        if let Some(sink) = &self.log_sink {
            sink(&ctx.settings().log_config())?;
        }
        let app = self.effective_app_name()?;
        info!(app, "loading configuration");

        let primary = self.primary_path()?;
        load_file(ctx, &primary, &mut report)?;

        if let Some(legacy) = self.legacy_path()? {
            let before = report.files.len();
            load_file(ctx, &legacy, &mut report)?;
            if let Some((_, FileStatus::Loaded { .. })) = report.files.get(before) {
                warn!(
                    "{} is deprecated, please use {}",
                    legacy.display(),
                    primary.display()
                );
            }
        }

        Ok(report)
    }

    /// Resolve a seat context: inherit everything from `parent`, then apply
    /// the seat's own file.
    pub fn load_seat<R>(
        &self,
        ctx: &mut Context<'_, R>,
        parent: &Context<'_, R>,
        seat: &str,
    ) -> Result<LoadReport, ConfError> {
        debug!(seat, "parsing seat configuration");
        let mut report = LoadReport::default();
        ctx.inherit(parent)?;
        load_file(ctx, &self.seat_path(seat)?, &mut report)?;
        Ok(report)
    }
}

fn stderr_sink(config: &LogConfig) -> Result<(), ConfError> {
    logging::init(config).map(|_| ())
}

fn load_file<R>(ctx: &mut Context<'_, R>, path: &Path, report: &mut LoadReport) -> Result<(), ConfError> {
    match ctx.parse_file(path) {
        Ok(status) => {
            report.files.push((path.to_path_buf(), status));
            Ok(())
        }
        Err(e) if e.is_unreadable_file() => {
            warn!("{e}");
            report.unreadable.push(e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// What a load pass did.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// A hook asked to stop; no file was read.
    pub exit_requested: bool,
    /// Every file looked at, in order, and whether it existed.
    pub files: Vec<(PathBuf, FileStatus)>,
    /// Files that exist but could not be read.
    pub unreadable: Vec<ConfError>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exit_requested {
            return writeln!(f, "exit requested");
        }
        for (path, status) in &self.files {
            match status {
                FileStatus::Missing => writeln!(f, "{}: not present", path.display())?,
                FileStatus::Loaded { options } => writeln!(f, "{}: {options} option(s)", path.display())?,
            }
        }
        for err in &self.unreadable {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{TestRecord, test_table};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    impl LogSettings for TestRecord {
        fn log_config(&self) -> LogConfig {
            LogConfig::select(self.debug, self.verbose, false)
        }
    }

    fn loader(dir: &TempDir) -> Loader {
        Loader::builder()
            .app_name("vtconf")
            .config_dir(dir.path())
            .legacy_file(dir.path().join("legacy.conf"))
            .no_logging()
    }

    #[test]
    fn app_name_sets_defaults() {
        let l = Loader::builder().app_name("vtconf");
        assert_eq!(l.primary_path().unwrap(), PathBuf::from("/etc/vtconf/vtconf.conf"));
        assert_eq!(l.legacy_path().unwrap(), Some(PathBuf::from("/etc/vtconf.conf")));
        assert_eq!(l.seat_path("seat1").unwrap(), PathBuf::from("/etc/vtconf/seat1.seat.conf"));
    }

    #[test]
    fn app_name_is_required() {
        assert!(matches!(Loader::builder().primary_path(), Err(ConfError::AppNameRequired)));
    }

    #[test]
    fn overrides() {
        let l = Loader::builder()
            .app_name("vtconf")
            .config_dir("/tmp/conf")
            .legacy_file("/tmp/old.conf");
        assert_eq!(l.primary_path().unwrap(), PathBuf::from("/tmp/conf/vtconf.conf"));
        assert_eq!(l.legacy_path().unwrap(), Some(PathBuf::from("/tmp/old.conf")));
        assert_eq!(l.no_legacy().legacy_path().unwrap(), None);
    }

    #[test]
    fn missing_files_are_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let table = test_table().unwrap();
        let mut ctx = Context::new(&table, TestRecord::default());
        let report = loader(&dir).load_main(&mut ctx, &["p"]).unwrap();
        assert!(!report.exit_requested);
        assert_eq!(report.files.len(), 2);
        assert!(report.files.iter().all(|(_, s)| *s == FileStatus::Missing));
    }

    #[test]
    fn exit_skips_files_and_logging() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("vtconf.conf"), "count 3\n").unwrap();
        let calls = Arc::new(Mutex::new(0));
        let seen = calls.clone();

        let table = test_table().unwrap();
        let mut ctx = Context::new(&table, TestRecord::default());
        let report = loader(&dir)
            .log_sink(move |_| {
                *seen.lock().unwrap() += 1;
                Ok(())
            })
            .load_main(&mut ctx, &["p", "--help"])
            .unwrap();
        assert!(report.exit_requested);
        assert!(report.files.is_empty());
        assert_eq!(ctx.settings().count, 7);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn log_config_handed_off_before_files() {
        let dir = TempDir::new().unwrap();
        // a file that flips verbose must not affect what the sink saw
        fs::write(dir.path().join("vtconf.conf"), "no-verbose\n").unwrap();
        let selected = Arc::new(Mutex::new(None));
        let seen = selected.clone();

        let table = test_table().unwrap();
        let mut ctx = Context::new(&table, TestRecord::default());
        loader(&dir)
            .log_sink(move |c| {
                *seen.lock().unwrap() = Some(*c);
                Ok(())
            })
            .load_main(&mut ctx, &["p", "-v"])
            .unwrap();
        assert_eq!(
            *selected.lock().unwrap(),
            Some(LogConfig::Info {
                debug: false,
                verbose: true
            })
        );
        assert!(!ctx.settings().verbose);
    }

    #[test]
    fn primary_then_legacy_later_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("vtconf.conf"), "count 3\nname primary\n").unwrap();
        fs::write(dir.path().join("legacy.conf"), "count 4\n").unwrap();

        let table = test_table().unwrap();
        let mut ctx = Context::new(&table, TestRecord::default());
        let report = loader(&dir).load_main(&mut ctx, &["p", "--count", "1"]).unwrap();
        assert_eq!(ctx.settings().count, 4);
        assert_eq!(ctx.settings().name.as_deref(), Some("primary"));
        assert_eq!(report.files[0].1, FileStatus::Loaded { options: 2 });
        assert_eq!(report.files[1].1, FileStatus::Loaded { options: 1 });
    }

    #[test]
    fn unreadable_file_is_collected() {
        let dir = TempDir::new().unwrap();
        // a directory where the primary file should be
        fs::create_dir(dir.path().join("vtconf.conf")).unwrap();
        fs::write(dir.path().join("legacy.conf"), "count 4\n").unwrap();

        let table = test_table().unwrap();
        let mut ctx = Context::new(&table, TestRecord::default());
        let report = loader(&dir).load_main(&mut ctx, &["p"]).unwrap();
        assert_eq!(report.unreadable.len(), 1);
        assert!(report.unreadable[0].is_unreadable_file());
        assert_eq!(ctx.settings().count, 4);
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("vtconf.conf"), "count lots\n").unwrap();
        let table = test_table().unwrap();
        let mut ctx = Context::new(&table, TestRecord::default());
        assert!(loader(&dir).load_main(&mut ctx, &["p"]).is_err());
    }

    #[test]
    fn seat_inherits_and_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("seat1.seat.conf"), "count 10\n").unwrap();
        let l = loader(&dir);
        let table = test_table().unwrap();

        let mut main = Context::new(&table, TestRecord::default());
        l.load_main(&mut main, &["p", "--count", "20"]).unwrap();

        let mut seat0 = Context::new(&table, TestRecord::default());
        let report = l.load_seat(&mut seat0, &main, "seat0").unwrap();
        assert_eq!(report.files[0].1, FileStatus::Missing);
        assert_eq!(seat0.settings().count, 20);

        let mut seat1 = Context::new(&table, TestRecord::default());
        l.load_seat(&mut seat1, &main, "seat1").unwrap();
        assert_eq!(seat1.settings().count, 10);
        assert_eq!(main.settings().count, 20);
    }

    #[test]
    fn report_display() {
        let report = LoadReport {
            exit_requested: false,
            files: vec![
                (PathBuf::from("/etc/vtconf/vtconf.conf"), FileStatus::Loaded { options: 3 }),
                (PathBuf::from("/etc/vtconf.conf"), FileStatus::Missing),
            ],
            unreadable: Vec::new(),
        };
        assert_eq!(
            report.to_string(),
            "/etc/vtconf/vtconf.conf: 3 option(s)\n/etc/vtconf.conf: not present\n"
        );
    }
}
