//! Bot process launch and supervision.
//!
//! After the readiness gate opens, the configured bot command is spawned
//! with the inherited environment (injected secrets flow through
//! untouched) and its exit status is propagated. An optional keepalive
//! pinger issues periodic HTTP GETs for the lifetime of the child;
//! ping failures are logged and never affect the bot.

use std::time::Duration;

use tokio::process::Command;
use tokio::signal;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::error::{Error, LaunchError, Result};

/// A resolved bot command ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BotCommand {
    /// Resolve the command to run: a CLI override wins over the config
    /// file; the `--auth` flag is appended for the bot's one-time
    /// interactive authorization flow.
    pub fn resolve(
        config: &BotConfig,
        override_argv: &[String],
        auth: bool,
    ) -> std::result::Result<Self, LaunchError> {
        let (program, mut args) = if let Some((head, tail)) = override_argv.split_first() {
            (head.clone(), tail.to_vec())
        } else if let Some(command) = &config.command {
            (command.clone(), config.args.clone())
        } else {
            return Err(LaunchError::NoCommand);
        };

        if auth {
            args.push("--auth".to_string());
        }
        Ok(Self { program, args })
    }

    fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Spawn the bot and wait for it to exit.
    ///
    /// Ctrl-c kills the child and returns cleanly; otherwise the child's
    /// exit status is mapped to `Ok` or a [`LaunchError`].
    pub async fn run(&self) -> Result<()> {
        info!(command = %self.display(), "starting bot");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                command: self.display(),
                source,
            })?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(Error::Io)?;
                if status.success() {
                    info!("bot exited cleanly");
                    Ok(())
                } else {
                    match status.code() {
                        Some(code) => Err(LaunchError::NonZeroExit { code }.into()),
                        None => Err(LaunchError::Killed.into()),
                    }
                }
            }
            _ = signal::ctrl_c() => {
                info!("shutdown signal received, stopping bot");
                let _ = child.kill().await;
                Ok(())
            }
        }
    }
}

/// Periodic HTTP GET against a fixed URL, for platforms that idle out
/// quiet workloads. Observability only.
#[derive(Debug, Clone)]
pub struct KeepalivePinger {
    url: String,
    interval: Duration,
}

impl KeepalivePinger {
    pub fn new(url: String, interval: Duration) -> Self {
        Self { url, interval }
    }

    /// Build a pinger from config when a ping URL is set.
    pub fn from_config(config: &BotConfig) -> Option<Self> {
        config.ping_url.as_ref().map(|url| {
            Self::new(
                url.clone(),
                Duration::from_secs(config.ping_interval_secs),
            )
        })
    }

    /// Ping forever. Run this on its own task and abort it when the bot
    /// exits.
    pub async fn run(self) {
        let client = reqwest::Client::new();
        let mut ticker = tokio::time::interval(self.interval);
        info!(url = %self.url, interval = ?self.interval, "starting keepalive pinger");

        loop {
            ticker.tick().await;
            match client.get(&self.url).send().await {
                Ok(response) => {
                    info!(url = %self.url, status = %response.status(), "keepalive ping");
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, "keepalive ping failed");
                }
            }
        }
    }
}
