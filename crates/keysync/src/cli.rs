//! Clap derive structures for the `keysync` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this module may
//! only depend on clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// keysync -- keypad codes that follow your bookings
#[derive(Debug, Parser)]
#[command(
    name = "keysync",
    version,
    about = "Keep smart-lock keypad codes in sync with vacation-rental bookings",
    long_about = "Creates, updates and revokes time-bounded keypad codes on a smart-lock\n\
        cloud so they mirror the reservations of a booking platform.\n\n\
        Every run is stateless: both APIs are re-read and reconciled from scratch.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "KEYSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "KEYSYNC_OUTPUT",
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

    /// Also write JSON logs to this file
    #[arg(long, env = "KEYSYNC_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Request timeout in seconds (overrides sync.timeout)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
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
    /// YAML
    Yaml,
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
    /// Reconcile keypad codes with bookings (one full run)
    #[command(alias = "sync")]
    Run(RunArgs),

    /// Inspect keypad codes on a lock
    Codes(CodesArgs),

    /// Inspect the bookings a run would consider
    #[command(alias = "b")]
    Bookings(BookingsArgs),

    /// Inspect and validate configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Log and count intended changes without writing or notifying
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

// ── Codes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CodesArgs {
    #[command(subcommand)]
    pub command: CodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CodesCommand {
    /// List the codes stored on a lock
    #[command(alias = "ls")]
    List {
        /// Numeric lock id
        lock_id: u64,
    },
}

// ── Bookings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BookingsArgs {
    #[command(subcommand)]
    pub command: BookingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BookingsCommand {
    /// List bookings in the sync window
    #[command(alias = "ls")]
    List {
        /// Include cancelled bookings and blocked periods
        #[arg(long, short = 'a')]
        all: bool,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the effective configuration (secrets redacted)
    Show,
    /// Validate the configuration without contacting any service
    Check,
    /// Write a starter config file with default settings
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
