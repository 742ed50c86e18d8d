//! # vtconf demo application
//!
//! A sample launcher that resolves console settings the way a console daemon
//! would at startup: command line first, then the system config files, then
//! one derived context per seat. This is **not** a real daemon; it prints the
//! resolved values instead of acting on them.
//!
//! ## Running
//!
//! ```sh
//! cargo run --features demo --example vtconf_demo -- show
//! cargo run --features demo --example vtconf_demo -- show -- --font-size 20 --debug
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature               | How to exercise it                                                           |
//! |-----------------------|------------------------------------------------------------------------------|
//! | Compiled defaults     | `show`                                                                       |
//! | Engine options        | `show -- --term linux --no-switchvt`                                         |
//! | Help / early exit     | `show -- --help`                                                             |
//! | Login command         | `show -- --login -- /bin/ls -l`                                              |
//! | Config files          | `--config-dir ./conf show` with `./conf/vtconf.conf`                         |
//! | Seat inheritance      | `--config-dir ./conf show --seat seat1` with `./conf/seat1.seat.conf`        |
//! | JSON dump             | `show --json`                                                                |
//! | Single key            | `show --key grab-session-next`                                               |
//! | Template              | `gen`                                                                        |

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vtconf::console::{self, ConsoleConfig};
use vtconf::{ConfError, ConfigResult, Context, Loader, OptionTable, help, ops};

const APP_NAME: &str = "vtconf";

/// vtconf demo: resolve console settings from argv and config files.
#[derive(Parser, Debug)]
#[command(name = "vtconf-demo")]
struct Cli {
    /// Read config files from this directory instead of /etc/vtconf.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Skip the deprecated /etc/vtconf.conf.
    #[arg(long, global = true)]
    no_legacy: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve and print the configuration.
    Show {
        /// Also resolve this seat (repeatable).
        #[arg(long)]
        seat: Vec<String>,

        /// Print the whole record as JSON.
        #[arg(long)]
        json: bool,

        /// Print only this option.
        #[arg(long)]
        key: Option<String>,

        /// Options for the engine, after `--`.
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Print a config file template with every default.
    Gen,
}

fn make_loader(cli: &Cli) -> Loader {
    let mut loader = Loader::builder().app_name(APP_NAME);
    if let Some(dir) = &cli.config_dir {
        loader = loader.config_dir(dir);
    }
    if cli.no_legacy {
        loader = loader.no_legacy();
    }
    loader
}

fn render(ctx: &Context<'_, ConsoleConfig>, json: bool, key: Option<&str>) -> Result<ConfigResult, ConfError> {
    match (json, key) {
        (true, _) => ops::dump_json(ctx),
        (false, Some(key)) => ops::get_value(ctx, key),
        (false, None) => Ok(ops::list_values(ctx)),
    }
}

fn show(
    loader: &Loader,
    table: &OptionTable<ConsoleConfig>,
    seats: &[String],
    json: bool,
    key: Option<&str>,
    args: &[String],
) -> Result<(), ConfError> {
    let argv: Vec<&str> = std::iter::once(APP_NAME)
        .chain(args.iter().map(String::as_str))
        .collect();

    let mut main = Context::new(table, ConsoleConfig::default());
    let report = loader.load_main(&mut main, &argv)?;
    if report.exit_requested {
        eprint!("{}", help::render_usage(APP_NAME, table));
        return Ok(());
    }
    eprint!("{report}");
    println!("{}", render(&main, json, key)?);

    let resolved: Vec<Result<Context<'_, ConsoleConfig>, ConfError>> = std::thread::scope(|s| {
        let handles: Vec<_> = seats
            .iter()
            .map(|seat| {
                let main = &main;
                s.spawn(move || -> Result<Context<'_, ConsoleConfig>, ConfError> {
                    let mut ctx = Context::new(table, ConsoleConfig::default());
                    loader.load_seat(&mut ctx, main, seat)?;
                    Ok(ctx)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| Err(ConfError::Usage("seat thread panicked".into()))))
            .collect()
    });

    for (seat, ctx) in seats.iter().zip(resolved) {
        println!("\n[{seat}]");
        println!("{}", render(&ctx?, json, key)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loader = make_loader(&cli);

    let table = match console::options() {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Invalid option table: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Commands::Show { seat, json, key, args } => show(&loader, &table, seat, *json, key.as_deref(), args),
        Commands::Gen => {
            print!("{}", ops::generate_template(APP_NAME, &table));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to load config:\n{e}");
            ExitCode::FAILURE
        }
    }
}
