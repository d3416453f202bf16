//! Command line arguments

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "modhost")]
#[command(about = "Module host: discovers, resolves and wires plugin modules")]
#[command(version)]
#[command(after_help = " * can be specified multiple times")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Directory holding the host's system modules
    #[arg(short = 's', long = "system-dir", value_name = "DIR")]
    pub system_dir: Option<PathBuf>,

    /// Directory holding user-installed modules
    #[arg(short = 'u', long = "user-dir", value_name = "DIR")]
    pub user_dir: Option<PathBuf>,

    /// Additional module directory*
    #[arg(short = 'm', long = "module-dir", value_name = "DIR", action = ArgAction::Append)]
    pub module_dirs: Vec<PathBuf>,

    /// Module name the host treats as obsolete*
    #[arg(long = "obsolete", value_name = "NAME", action = ArgAction::Append)]
    pub obsolete: Vec<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Increase verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

impl Args {
    /// Colour preference from the command line; `None` leaves it to config/TTY
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Net -v/-q offset
    pub fn verbosity(&self) -> i8 {
        (self.verbose.min(8) as i8) - (self.quiet.min(8) as i8)
    }
}
