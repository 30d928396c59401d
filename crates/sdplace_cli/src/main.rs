//! sdplace CLI: places packed SerDes macros of an iCE40 netlist.
//!
//! Provides `sdplace place` to assign BELs to every SerDes logic cell,
//! `sdplace analyze` to inspect the groups without placing them, and
//! `sdplace config` to print the effective placer configuration.

#![warn(missing_docs)]

mod analyze;
mod config_cmd;
mod pipeline;
mod place;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// sdplace: priority-ordered SerDes block placer.
#[derive(Parser, Debug)]
#[command(name = "sdplace", version, about = "SerDes block placer")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show per-group and per-block placement notes.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `sdplace.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output format for diagnostics and reports.
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place all SerDes blocks of a netlist and write the BELs.
    Place(PlaceArgs),
    /// Report SerDes groups, IO sites, and blocks without placing.
    Analyze(AnalyzeArgs),
    /// Print the effective placer configuration as TOML.
    Config(ConfigArgs),
}

/// Arguments for the `sdplace place` subcommand.
#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// Netlist JSON file.
    pub netlist: String,

    /// Where to write the placed netlist (default: overwrite the input).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `sdplace analyze` subcommand.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Netlist JSON file.
    pub netlist: String,
}

/// Arguments for the `sdplace config` subcommand.
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to show notes.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Output format.
    pub format: ReportFormat,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("TERM").is_some() && cli.format == ReportFormat::Text,
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
        format: cli.format,
    };

    let result = match cli.command {
        Command::Place(ref args) => place::run(args, &global),
        Command::Analyze(ref args) => analyze::run(args, &global),
        Command::Config(ref args) => config_cmd::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
