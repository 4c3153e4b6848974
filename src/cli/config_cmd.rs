//! Handlers for the `config` subcommands.

use std::fs;

use serde_json::json;

use crate::cli::command::{ConfigInitArgs, ConfigPathArg};
use crate::cli::output;
use crate::config::{Config, CONFIG_TEMPLATE};
use crate::error::{Error, Result};

/// Generate a configuration file from the built-in template.
pub fn execute_init(args: &ConfigInitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        output::error(&format!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        ));
        return Err(Error::CheckFailed("config file already exists".into()));
    }

    if let Some(parent) = args.path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.path, CONFIG_TEMPLATE)?;

    output::success(&format!("Wrote {}", args.path.display()));
    Ok(())
}

/// Display the effective configuration with defaults applied.
///
/// Only non-secret settings live in the config file, so there is nothing
/// to redact; secrets stay in the environment and are reported by
/// `check env` as set/missing names only.
pub fn execute_show(args: &ConfigPathArg) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "backend": {
                "host": config.backend.host,
                "port": config.backend.port,
                "keep_alive": config.backend.keep_alive.as_ref().map(|k| k.as_str().to_string()),
                "bind_addr": config.backend.bind_addr.as_ref().map(|b| b.to_string()),
            },
            "gate": {
                "interval_secs": config.gate.interval_secs,
                "deadline_secs": config.gate.deadline_secs,
                "connect_timeout_secs": config.gate.connect_timeout_secs,
                "max_attempts": config.gate.max_attempts,
            },
            "bot": {
                "cache_dir": config.bot.cache_dir.display().to_string(),
                "command": config.bot.command,
                "ping_url": config.bot.ping_url,
            },
            "logging": {
                "level": config.logging.level,
                "format": config.logging.format,
            },
        }));
        return Ok(());
    }

    output::section("Backend");
    output::field("Host", &config.backend.host);
    output::field("Port", config.backend.port);
    if let Some(keep_alive) = &config.backend.keep_alive {
        output::field("Keep-alive", keep_alive);
    }
    if let Some(bind_addr) = &config.backend.bind_addr {
        output::field("Bind address", bind_addr);
    }

    output::section("Gate");
    output::field("Interval", format!("{}s", config.gate.interval_secs));
    output::field("Deadline", format!("{}s", config.gate.deadline_secs));
    output::field(
        "Connect timeout",
        format!("{}s", config.gate.connect_timeout_secs),
    );
    if let Some(max) = config.gate.max_attempts {
        output::field("Max attempts", max);
    }

    output::section("Bot");
    output::field("Cache dir", config.bot.cache_dir.display());
    if let Some(command) = &config.bot.command {
        output::field("Command", command);
    }
    if let Some(ping_url) = &config.bot.ping_url {
        output::field("Ping URL", ping_url);
        output::field("Ping interval", format!("{}s", config.bot.ping_interval_secs));
    }

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    Ok(())
}

/// Validate a configuration file.
pub fn execute_validate(args: &ConfigPathArg) -> Result<()> {
    match Config::load(&args.config) {
        Ok(_) => {
            if output::is_json() {
                output::json_output(json!({
                    "command": "config.validate",
                    "status": "valid",
                    "path": args.config.display().to_string(),
                }));
                return Ok(());
            }
            output::success(&format!("{} is valid", args.config.display()));
            Ok(())
        }
        Err(e) => {
            output::error(&format!("{e}"));
            Err(e)
        }
    }
}
