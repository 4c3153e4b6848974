//! Handler for the `run` command: the full supervised startup sequence.
//!
//! Order matters and mirrors the deployment contract: secrets are
//! validated before anything else (fail fast on a bad Secret), the token
//! cache is seeded before the bot can look for it, and the bot is not
//! spawned until the gate has seen the backend accept a connection.

use crate::cache::{self, SeedOutcome};
use crate::cli::command::RunArgs;
use crate::cli::output;
use crate::config::{Config, Secrets};
use crate::error::Result;
use crate::gate::ReadinessGate;
use crate::launcher::{BotCommand, KeepalivePinger};

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;

    let mut logging = config.logging.clone();
    if output::is_json() {
        logging.format = "json".into();
    }
    logging.init();

    let secrets = Secrets::from_env()?;
    let command = BotCommand::resolve(&config.bot, &args.command, args.auth)?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::field(
        "Backend",
        format!("{}:{}", config.backend.host, config.backend.port),
    );
    output::field("Cache dir", config.bot.cache_dir.display());
    if let Some(keep_alive) = &config.backend.keep_alive {
        output::field("Keep-alive", keep_alive);
    }

    match cache::seed_token_cache(
        &config.bot.cache_dir,
        &secrets.spotify_username,
        secrets.token_cache.as_deref(),
    )? {
        SeedOutcome::Seeded => output::success("Token cache seeded"),
        SeedOutcome::AlreadyPresent => output::success("Token cache present"),
        SeedOutcome::NoSeed => {
            output::warning("No token cache and TOKEN_CACHE unset; bot may need --auth")
        }
    }

    if args.skip_gate {
        output::warning("Readiness gate skipped");
    } else {
        let gate = ReadinessGate::new(config.gate_config());
        let target = format!("{}:{}", gate.config().host, gate.config().port);
        let pb = output::spinner(&format!("Waiting for backend at {target}..."));
        match gate.wait().await {
            Ok(report) => {
                output::spinner_success(
                    &pb,
                    &format!("Backend ready ({} probes)", report.attempts),
                );
            }
            Err(e) => {
                output::spinner_fail(&pb, "Backend never became ready");
                return Err(e.into());
            }
        }
    }

    let pinger = KeepalivePinger::from_config(&config.bot).map(|p| tokio::spawn(p.run()));

    let result = command.run().await;

    if let Some(handle) = pinger {
        handle.abort();
    }

    result
}
