mod app;
mod config;
mod countdown;
mod duration;
mod error;
mod gradient;
mod hooks;
mod notify;
mod render;
mod sequence;
mod terminal;
mod timer;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::app::{App, Outcome};
use crate::config::{Config, Settings};
use crate::error::Result;
use crate::hooks::HookRunner;
use crate::render::TimeFormat;
use crate::sequence::Sequence;

const INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "timer",
    about = "timer is like sleep, but with progress report",
    long_about = "timer is like sleep, but with progress report.

Start a simple timer with:

    timer 10m

Name it, or count down to a time of day:

    timer work=50m
    timer -t 14:30

Set multiple timers and loop between them, running commands as each one finishes:

    timer --loops 10 --run 'tput bel' --run \"say '{{.Name}} is done!'\" work=25m rest=5m",
    version,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Timers to run: a duration (25m, 1h30m, 90), name=duration, or a preset name
    timers: Vec<String>,

    /// Count down to a time of day instead (14:30, 2:30PM, 14:30:15)
    #[arg(short, long, conflicts_with = "timers")]
    time: Option<String>,

    /// Name for timers given without one (default: unnamed)
    #[arg(short, long)]
    name: Option<String>,

    /// Render full screen, centered
    #[arg(short, long)]
    fullscreen: bool,

    /// Clock format for start and end times
    #[arg(long, value_enum)]
    format: Option<TimeFormat>,

    /// Progress bar gradient: a preset (default, ocean, sunset, forest, mono) or "#RRGGBB,#RRGGBB"
    #[arg(short, long)]
    gradient: Option<String>,

    /// How many times to loop through the timers (-1 loops forever)
    #[arg(short, long, allow_negative_numbers = true)]
    loops: Option<i64>,

    /// Command to run when a timer finishes ({{.Name}} and {{.Duration}} are substituted)
    #[arg(short, long)]
    run: Vec<String>,

    /// Keep the final frame on screen when the timer exits
    #[arg(short, long)]
    keep: bool,

    /// Send a desktop notification when a timer finishes
    #[arg(long)]
    notify: bool,

    /// Path to the config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log lifecycle events to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the manual page
    #[command(hide = true)]
    Man,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(Commands::Man) = cli.command {
        return match print_man() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&cli).await {
        Ok(Outcome::Completed) => {
            println!("all done!");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Interrupted) => {
            eprintln!("interrupted");
            ExitCode::from(INTERRUPTED)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<Outcome> {
    let config = Config::load(cli.config.as_deref())?;
    let now = chrono::Local::now();
    let settings = Settings::build(cli, &config, &now)?;
    debug!(timers = settings.timers.len(), loops = ?settings.loops, "settings resolved");

    let sequence = Sequence::new(settings.timers, settings.loops)?;
    let app = App::new(sequence, now.time(), settings.ends_at);
    let hooks = HookRunner::new(settings.actions);
    timer::run(app, &settings.display, &hooks).await
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "timer=debug" } else { "timer=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn print_man() -> std::io::Result<()> {
    let man = clap_mangen::Man::new(Cli::command());
    man.render(&mut std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn time_conflicts_with_timers() {
        assert!(Cli::try_parse_from(["timer", "-t", "14:30", "5m"]).is_err());
    }

    #[test]
    fn man_subcommand_parses() {
        let cli = Cli::try_parse_from(["timer", "man"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Man)));
    }

    #[test]
    fn man_page_mentions_flags() {
        let mut out = Vec::new();
        clap_mangen::Man::new(Cli::command()).render(&mut out).unwrap();
        let page = String::from_utf8(out).unwrap();
        assert!(page.contains("loops"));
        assert!(page.contains("fullscreen"));
    }

    #[test]
    fn repeated_run_flags_are_kept_in_order() {
        let cli = Cli::try_parse_from(["timer", "-r", "tput bel", "-r", "say hi", "5m"]).unwrap();
        assert_eq!(cli.run, ["tput bel", "say hi"]);
    }
}
