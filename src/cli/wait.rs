//! Handler for the `wait` command (init-container mode).

use serde_json::json;

use crate::cli::command::WaitArgs;
use crate::cli::output;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::gate::{GateConfig, ReadinessGate};

/// Execute the wait command.
pub async fn execute(args: &WaitArgs) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;

    let mut logging = config.logging.clone();
    if output::is_json() {
        logging.format = "json".into();
    }
    logging.init();

    let gate_config = apply_overrides(config.gate_config(), args)?;
    let target = format!("{}:{}", gate_config.host, gate_config.port);
    let gate = ReadinessGate::new(gate_config);

    let pb = output::spinner(&format!("Waiting for backend at {target}..."));
    match gate.wait().await {
        Ok(report) => {
            output::spinner_success(&pb, &format!("Backend ready at {target}"));
            if output::is_json() {
                output::json_output(json!({
                    "command": "wait",
                    "status": "ready",
                    "target": target,
                    "attempts": report.attempts,
                    "failed_attempts": report.failed_attempts,
                    "elapsed_ms": report.elapsed.as_millis() as u64,
                }));
            } else if output::verbosity() > 0 {
                output::field("Attempts", report.attempts);
                output::field("Elapsed", format!("{:?}", report.elapsed));
            }
            Ok(())
        }
        Err(e) => {
            output::spinner_fail(&pb, &format!("Backend at {target} never became ready"));
            Err(e.into())
        }
    }
}

/// Overlay CLI flags onto the config-derived gate parameters.
fn apply_overrides(mut gate: GateConfig, args: &WaitArgs) -> Result<GateConfig> {
    if let Some(host) = &args.host {
        gate.host = host.clone();
    }
    if let Some(port) = args.port {
        gate.port = port;
    }
    if let Some(interval) = args.interval {
        gate.interval = nonzero_secs("interval", interval)?;
    }
    if let Some(deadline) = args.deadline {
        gate.deadline = nonzero_secs("deadline", deadline)?;
    }
    if let Some(connect_timeout) = args.connect_timeout {
        gate.connect_timeout = nonzero_secs("connect-timeout", connect_timeout)?;
    }
    if let Some(max_attempts) = args.max_attempts {
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max-attempts",
                reason: "cannot be zero".into(),
            }
            .into());
        }
        gate.max_attempts = Some(max_attempts);
    }
    Ok(gate)
}

fn nonzero_secs(field: &'static str, value: u64) -> Result<std::time::Duration> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "cannot be zero; the gate never waits unbounded".into(),
        }
        .into());
    }
    Ok(std::time::Duration::from_secs(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn wait_args() -> WaitArgs {
        WaitArgs {
            config: PathBuf::from("/nonexistent/spoopaboot.toml"),
            host: None,
            port: None,
            interval: None,
            deadline: None,
            connect_timeout: None,
            max_attempts: None,
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut args = wait_args();
        args.host = Some("model-server".into());
        args.port = Some(8080);
        args.deadline = Some(30);

        let gate = apply_overrides(GateConfig::default(), &args).unwrap();
        assert_eq!(gate.host, "model-server");
        assert_eq!(gate.port, 8080);
        assert_eq!(gate.deadline, Duration::from_secs(30));
        // Untouched fields keep config values.
        assert_eq!(gate.interval, Duration::from_secs(2));
    }

    #[test]
    fn zero_deadline_override_is_rejected() {
        let mut args = wait_args();
        args.deadline = Some(0);
        assert!(apply_overrides(GateConfig::default(), &args).is_err());
    }

    #[test]
    fn zero_max_attempts_override_is_rejected() {
        let mut args = wait_args();
        args.max_attempts = Some(0);
        assert!(apply_overrides(GateConfig::default(), &args).is_err());
    }
}
