//! The console daemon's settings record and option table.
//!
//! [`ConsoleConfig`] holds every option the daemon understands plus a few
//! derived fields that hooks fill in. [`options`] builds the table that binds
//! them; build it once and share it between the main context and every seat
//! context.
//!
//! | Group    | Options |
//! |----------|---------|
//! | General  | `help`, `verbose`, `debug`, `silent` |
//! | Seat     | `vt`, `switchvt`, `seats` |
//! | Session  | `session-max` |
//! | Terminal | `login`, `term`, `palette`, `sb-size` |
//! | Input    | `xkb-layout`, `xkb-variant`, `xkb-options`, `xkb-repeat-delay`, `xkb-repeat-rate` |
//! | Grabs    | `grab-scroll-up`, `grab-scroll-down`, `grab-page-up`, `grab-page-down`, `grab-session-next`, `grab-session-prev`, `grab-session-close`, `grab-terminal-new` |
//! | Video    | `fbdev`, `dumb`, `fps`, `render-engine`, `render-timing` |
//! | Font     | `font-engine`, `font-size`, `font-name`, `font-dpi` |

use std::borrow::Cow;

use serde::Serialize;

use crate::error::ConfError;
use crate::field;
use crate::keysym;
use crate::logging::{LogConfig, LogSettings};
use crate::table::{AfterCheck, Descriptor, OptionTable};
use crate::types::{Chord, ChordStep, Modifiers, Text, TextList};

const FALLBACK_SHELL: &str = "/bin/sh";
const ALL_SEATS: &str = "all";

const DEFAULT_SEATS: &[Text] = &[Cow::Borrowed("seat0")];

const CTRL_ALT: Modifiers = Modifiers::CONTROL.union(Modifiers::ALT);
const GRAB_SCROLL_UP: &[ChordStep] = &[ChordStep::new(Modifiers::SHIFT, keysym::UP)];
const GRAB_SCROLL_DOWN: &[ChordStep] = &[ChordStep::new(Modifiers::SHIFT, keysym::DOWN)];
const GRAB_PAGE_UP: &[ChordStep] = &[ChordStep::new(Modifiers::SHIFT, keysym::PRIOR)];
const GRAB_PAGE_DOWN: &[ChordStep] = &[ChordStep::new(Modifiers::SHIFT, keysym::NEXT)];
const GRAB_SESSION_NEXT: &[ChordStep] = &[ChordStep::new(CTRL_ALT, keysym::RIGHT)];
const GRAB_SESSION_PREV: &[ChordStep] = &[ChordStep::new(CTRL_ALT, keysym::LEFT)];
const GRAB_SESSION_CLOSE: &[ChordStep] = &[ChordStep::new(CTRL_ALT, keysym::LOWER_W)];
const GRAB_TERMINAL_NEW: &[ChordStep] = &[ChordStep::new(CTRL_ALT, keysym::RETURN)];

/// Resolved console settings.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub help: bool,
    pub verbose: bool,
    pub debug: bool,
    pub silent: bool,

    /// VT device to run on (seat0 only). `None` picks one automatically.
    pub vt: Option<Text>,
    pub switchvt: bool,
    pub seats: TextList,

    pub session_max: u32,

    /// Run the command after `--` instead of the shell.
    pub login: bool,
    pub term: Option<Text>,
    pub palette: Option<Text>,
    /// Scrollback size in lines.
    pub sb_size: u32,

    pub xkb_layout: Option<Text>,
    pub xkb_variant: Option<Text>,
    pub xkb_options: Option<Text>,
    /// Milliseconds before key repeat starts.
    pub xkb_repeat_delay: u32,
    /// Milliseconds between repeats.
    pub xkb_repeat_rate: u32,

    pub grab_scroll_up: Chord,
    pub grab_scroll_down: Chord,
    pub grab_page_up: Chord,
    pub grab_page_down: Chord,
    pub grab_session_next: Chord,
    pub grab_session_prev: Chord,
    pub grab_session_close: Chord,
    pub grab_terminal_new: Chord,

    pub fbdev: bool,
    pub dumb: bool,
    pub fps: u32,
    pub render_engine: Option<Text>,
    pub render_timing: bool,

    pub font_engine: Option<Text>,
    pub font_size: u32,
    pub font_name: Option<Text>,
    pub font_dpi: u32,

    /// Set when `--help` asked to stop.
    pub exit: bool,
    /// `seats` was exactly `all`.
    pub all_seats: bool,
    /// The process to spawn in each terminal.
    pub argv: Vec<String>,
}

impl LogSettings for ConsoleConfig {
    fn log_config(&self) -> LogConfig {
        LogConfig::select(self.debug, self.verbose, self.silent)
    }
}

fn aftercheck_help(conf: &mut ConsoleConfig, ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
    if conf.help {
        conf.exit = true;
        ctx.request_exit();
    }
    Ok(())
}

fn aftercheck_debug(conf: &mut ConsoleConfig, _ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
    if conf.debug {
        conf.verbose = true;
    }
    Ok(())
}

fn aftercheck_seats(conf: &mut ConsoleConfig, _ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
    conf.all_seats = matches!(&*conf.seats, [only] if only == ALL_SEATS);
    Ok(())
}

fn aftercheck_session_max(conf: &mut ConsoleConfig, _ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
    if conf.session_max == 0 {
        return Err(ConfError::Usage("--session-max must be at least 1".into()));
    }
    Ok(())
}

fn aftercheck_login(conf: &mut ConsoleConfig, ctx: &mut AfterCheck<'_>) -> Result<(), ConfError> {
    if conf.login {
        let rest = ctx.claim_trailing()?;
        if rest.is_empty() {
            return Err(ConfError::Usage("Arguments for --login missing".into()));
        }
        conf.argv = rest.to_vec();
    } else {
        let shell = ctx.env_var("SHELL").unwrap_or(FALLBACK_SHELL);
        conf.argv = vec![shell.to_string()];
    }
    Ok(())
}

fn inherit_derived(parent: &ConsoleConfig, child: &mut ConsoleConfig) {
    child.exit = parent.exit;
    child.all_seats = parent.all_seats;
    child.argv = parent.argv.clone();
}

/// Build the console option table.
pub fn options() -> Result<OptionTable<ConsoleConfig>, ConfError> {
    type C = ConsoleConfig;

    OptionTable::builder()
        .section("General Options")
        .option(
            Descriptor::boolean(Some('h'), "help", field!(C, help), false)
                .after_check(aftercheck_help)
                .doc("Print this help and exit"),
        )
        .option(
            Descriptor::boolean(Some('v'), "verbose", field!(C, verbose), false)
                .after_check(aftercheck_debug)
                .doc("Print verbose messages"),
        )
        .option(
            Descriptor::boolean(None, "debug", field!(C, debug), false)
                .after_check(aftercheck_debug)
                .doc("Enable debug mode"),
        )
        .option(Descriptor::boolean(None, "silent", field!(C, silent), false).doc("Suppress notices and warnings"))
        .section("Seat Options")
        .option(Descriptor::vt(None, "vt", field!(C, vt)).doc("Select which VT to run on on seat0"))
        .option(
            Descriptor::boolean(Some('s'), "switchvt", field!(C, switchvt), false).doc("Automatically switch to VT"),
        )
        .option(
            Descriptor::string_list(None, "seats", field!(C, seats), DEFAULT_SEATS)
                .after_check(aftercheck_seats)
                .doc("Select seats or pass 'all' to run on all seats"),
        )
        .section("Session Options")
        .option(
            Descriptor::uint(None, "session-max", field!(C, session_max), 50)
                .after_check(aftercheck_session_max)
                .doc("Maximum number of sessions"),
        )
        .section("Terminal Options")
        .option(
            Descriptor::boolean(Some('l'), "login", field!(C, login), false)
                .after_check(aftercheck_login)
                .consumes_trailing()
                .doc("Start the process given after '--' instead of the shell"),
        )
        .option(
            Descriptor::string(Some('t'), "term", field!(C, term), Some("xterm-256color"))
                .doc("Value of TERM for the child process"),
        )
        .option(Descriptor::string(None, "palette", field!(C, palette), None).doc("Select the color palette"))
        .option(
            Descriptor::uint(None, "sb-size", field!(C, sb_size), 1000).doc("Size of the scrollback buffer in lines"),
        )
        .section("Input Options")
        .option(Descriptor::string(None, "xkb-layout", field!(C, xkb_layout), Some("us")).doc("XkbLayout for input devices"))
        .option(
            Descriptor::string(None, "xkb-variant", field!(C, xkb_variant), Some("")).doc("XkbVariant for input devices"),
        )
        .option(
            Descriptor::string(None, "xkb-options", field!(C, xkb_options), Some("")).doc("XkbOptions for input devices"),
        )
        .option(
            Descriptor::uint(None, "xkb-repeat-delay", field!(C, xkb_repeat_delay), 250)
                .doc("Initial delay for key repeat in ms"),
        )
        .option(
            Descriptor::uint(None, "xkb-repeat-rate", field!(C, xkb_repeat_rate), 50)
                .doc("Delay between two key repeats in ms"),
        )
        .section("Grabs / Keyboard Shortcuts")
        .option(
            Descriptor::chord(None, "grab-scroll-up", field!(C, grab_scroll_up), Chord::from_static(GRAB_SCROLL_UP))
                .doc("Scroll up"),
        )
        .option(
            Descriptor::chord(
                None,
                "grab-scroll-down",
                field!(C, grab_scroll_down),
                Chord::from_static(GRAB_SCROLL_DOWN),
            )
            .doc("Scroll down"),
        )
        .option(
            Descriptor::chord(None, "grab-page-up", field!(C, grab_page_up), Chord::from_static(GRAB_PAGE_UP))
                .doc("Scroll one page up"),
        )
        .option(
            Descriptor::chord(None, "grab-page-down", field!(C, grab_page_down), Chord::from_static(GRAB_PAGE_DOWN))
                .doc("Scroll one page down"),
        )
        .option(
            Descriptor::chord(
                None,
                "grab-session-next",
                field!(C, grab_session_next),
                Chord::from_static(GRAB_SESSION_NEXT),
            )
            .doc("Switch to the next session"),
        )
        .option(
            Descriptor::chord(
                None,
                "grab-session-prev",
                field!(C, grab_session_prev),
                Chord::from_static(GRAB_SESSION_PREV),
            )
            .doc("Switch to the previous session"),
        )
        .option(
            Descriptor::chord(
                None,
                "grab-session-close",
                field!(C, grab_session_close),
                Chord::from_static(GRAB_SESSION_CLOSE),
            )
            .doc("Close the current session"),
        )
        .option(
            Descriptor::chord(
                None,
                "grab-terminal-new",
                field!(C, grab_terminal_new),
                Chord::from_static(GRAB_TERMINAL_NEW),
            )
            .doc("Create a new terminal session"),
        )
        .section("Video Options")
        .option(Descriptor::boolean(None, "fbdev", field!(C, fbdev), false).doc("Use fbdev instead of DRM"))
        .option(Descriptor::boolean(None, "dumb", field!(C, dumb), false).doc("Use dumb DRM instead of accelerated DRM"))
        .option(Descriptor::uint(None, "fps", field!(C, fps), 50).doc("Limit frame rate"))
        .option(Descriptor::string(None, "render-engine", field!(C, render_engine), None).doc("Console renderer"))
        .option(
            Descriptor::boolean(None, "render-timing", field!(C, render_timing), false)
                .doc("Print renderer timing information"),
        )
        .section("Font Options")
        .option(Descriptor::string(None, "font-engine", field!(C, font_engine), Some("pango")).doc("Font engine"))
        .option(Descriptor::uint(None, "font-size", field!(C, font_size), 12).doc("Font size in points"))
        .option(Descriptor::string(None, "font-name", field!(C, font_name), Some("monospace")).doc("Font name"))
        .option(Descriptor::uint(None, "font-dpi", field!(C, font_dpi), 96).doc("Force DPI value for all fonts"))
        .on_inherit(inherit_derived)
        .build()
}
