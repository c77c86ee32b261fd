//! Clap derive structures for the `twinforge` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// twinforge -- firmware workbench CLI for ESP32 digital-twin benches
#[derive(Debug, Parser)]
#[command(
    name = "twinforge",
    version,
    about = "Compile firmware, deliver it over the air, and watch the board",
    long_about = "A workbench CLI for ESP32 lab benches.\n\n\
        Compiles firmware remotely, assigns builds to devices over OTA,\n\
        and mirrors the board's pin and connectivity state locally.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (overrides the config file)
    #[arg(long, short = 'b', env = "TWINFORGE_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Target device id
    #[arg(long, short = 'd', env = "TWINFORGE_DEVICE", global = true)]
    pub device: Option<String>,

    /// Session token
    #[arg(long, env = "TWINFORGE_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TWINFORGE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "TWINFORGE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "TWINFORGE_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the device's connectivity status
    #[command(alias = "st")]
    Status,

    /// Show the 40-pin digital twin
    Pins,

    /// Compile a firmware source file remotely
    Compile(CompileArgs),

    /// Compile a source file and assign the build over OTA
    Deploy(DeployArgs),

    /// Assign an already-compiled build to the device
    Assign(AssignArgs),

    /// Show observed OTA delivery/fallback events
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Confirm the device shares the operator's Wi-Fi network
    ConfirmNetwork,

    /// Check that the backend is reachable
    Ping,
}

// ── Per-command arguments ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Firmware source file (use "-" for stdin)
    pub source: PathBuf,
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Firmware source file (use "-" for stdin)
    pub source: PathBuf,

    /// After assignment, poll until a delivery/fallback event for the
    /// build is observed (or this many seconds pass)
    #[arg(long, value_name = "SECONDS")]
    pub wait: Option<u64>,
}

#[derive(Debug, Args)]
pub struct AssignArgs {
    /// Server-issued build id from a previous compile
    pub build_id: String,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Keep polling and print events as they are observed
    #[arg(long, short = 'f')]
    pub follow: bool,
}
