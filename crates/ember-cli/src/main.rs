//! Ember CLI - Command-line interface for Ember firework shows

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{init, run, validate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Headless particle-effect and firework show runner", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a show without a display and report frame statistics
    Run {
        /// Path to show file (built-in show if omitted)
        show: Option<PathBuf>,

        /// Number of frames to simulate (defaults to the show's `frames`)
        #[arg(long)]
        frames: Option<u64>,

        /// Random seed (defaults to the show's `seed`, else random)
        #[arg(long)]
        seed: Option<u64>,

        /// Print a frame report every N frames (0 for summary only)
        #[arg(long, default_value = "100")]
        report_every: u64,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Write the built-in show to a file
    Init {
        /// Destination show file
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check a show file and summarize it
    Validate {
        /// Path to show file
        show: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger_builder(log_filter(cli.verbose, cli.quiet)).init();

    match cli.command {
        Commands::Run {
            show,
            frames,
            seed,
            report_every,
            format,
        } => run::run(run::RunArgs {
            show,
            frames,
            seed,
            report_every,
            format,
        }),
        Commands::Init { path, force } => init::run(&path, force),
        Commands::Validate { show } => validate::run(&show),
    }
}

/// `-v` takes precedence over `-q`; each extra `-v` lowers the threshold a level
fn log_filter(verbose: u8, quiet: bool) -> log::LevelFilter {
    match verbose {
        0 if quiet => log::LevelFilter::Error,
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// `RUST_LOG` still overrides the command-line level when set
fn logger_builder(level: log::LevelFilter) -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(log_filter(0, false), LevelFilter::Warn);
        assert_eq!(log_filter(0, true), LevelFilter::Error);
        assert_eq!(log_filter(1, false), LevelFilter::Info);
        assert_eq!(log_filter(2, false), LevelFilter::Debug);
        assert_eq!(log_filter(3, false), LevelFilter::Trace);
        assert_eq!(log_filter(7, true), LevelFilter::Trace);
    }

    #[test]
    fn verbose_logger_lets_info_through() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let logger = logger_builder(log_filter(1, false)).build();
        assert_eq!(logger.filter(), LevelFilter::Info);
        let info = log::Metadata::builder()
            .level(log::Level::Info)
            .target("ember")
            .build();
        assert!(log::Log::enabled(&logger, &info));

        let quiet = logger_builder(log_filter(0, true)).build();
        assert!(!log::Log::enabled(&quiet, &info));
    }

    #[test]
    fn cli_counts_verbose_flags() {
        let cli = Cli::try_parse_from(["ember", "-vv", "validate", "show.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(log_filter(cli.verbose, cli.quiet), LevelFilter::Debug);
    }
}
