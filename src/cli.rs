use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

/// Which console to run.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Mode {
    /// Socket-first console with status, stats and history
    Console,
    /// HTTP-only console with date/time and toggles
    Panel,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Console => write!(f, "console"),
            Mode::Panel => write!(f, "panel"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "command-console")]
#[command(version)]
#[command(about = "A terminal command console for an assistant backend")]
pub struct Args {
    /// Console flavour
    #[arg(long, value_enum, default_value = "console")]
    pub mode: Mode,

    /// Base URL of the REST API (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// WebSocket URL of the realtime channel (overrides config)
    #[arg(long)]
    pub ws_url: Option<String>,

    /// Never open the realtime channel; send every command over HTTP
    #[arg(long)]
    pub http_only: bool,

    /// Path to a TOML config file (defaults to ./console.toml when present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Keep at most this many console lines
    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,
}
