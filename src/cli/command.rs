//! Command-line interface definitions.
//!
//! Defines the CLI structure for spoopaboot using `clap`. Subcommands
//! cover the readiness gate alone (init-container mode), the full
//! supervised startup, diagnostic checks, and config management.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Startup supervisor and readiness gate for the spoopafu bot deployment
#[derive(Parser, Debug)]
#[command(name = "spoopaboot")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the spoopaboot CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for the backend to accept connections, then exit
    Wait(WaitArgs),

    /// Validate env, seed the token cache, gate, and launch the bot
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `spoopaboot check`.
///
/// Diagnostics for operators: each check reports its findings and exits
/// nonzero on failure.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
    /// Verify the injected secret environment is complete.
    Env(ConfigPathArg),
    /// Probe backend reachability once (TCP, plus HTTP version when up).
    Backend(ConfigPathArg),
}

/// Subcommands for `spoopaboot config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from the template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `wait` subcommand.
///
/// All optional fields override the corresponding configuration file
/// values; the config file itself is optional in this mode so the binary
/// can run as a bare init container.
#[derive(Parser, Debug)]
pub struct WaitArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Override the backend host to probe.
    #[arg(long)]
    pub host: Option<String>,

    /// Override the backend port to probe.
    #[arg(long)]
    pub port: Option<u16>,

    /// Override the probe interval in seconds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Override the overall deadline in seconds.
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Override the per-probe connect timeout in seconds.
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Cap the number of probes.
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Skip the readiness gate (backend already verified).
    #[arg(long)]
    pub skip_gate: bool,

    /// Forward --auth to the bot for its one-time authorization flow.
    #[arg(long)]
    pub auth: bool,

    /// Bot command to launch, overriding [bot].command from the config.
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the `config init` subcommand.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the generated configuration file.
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}
