//! CLI module graph.

pub mod check;
pub mod command;
pub mod config_cmd;
pub mod output;
pub mod paths;
pub mod run;
pub mod wait;

use crate::error::Result;
use command::{CheckCommand, Cli, Commands, ConfigCommand};

/// Dispatch a parsed CLI invocation to its handler.
pub async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Wait(args) => wait::execute(args).await,
        Commands::Run(args) => run::execute(args).await,
        Commands::Check(check) => match check {
            CheckCommand::Config(args) => check::execute_config(args),
            CheckCommand::Env(args) => check::execute_env(args),
            CheckCommand::Backend(args) => check::execute_backend(args).await,
        },
        Commands::Config(config) => match config {
            ConfigCommand::Init(args) => config_cmd::execute_init(args),
            ConfigCommand::Show(args) => config_cmd::execute_show(args),
            ConfigCommand::Validate(args) => config_cmd::execute_validate(args),
        },
    }
}
