//! Readiness gate: block until the model backend accepts TCP connections.
//!
//! This replaces the deployment's shell init-container loop. The probe is
//! a plain TCP connect; success is the sole readiness signal. Unlike the
//! shell loop the wait is bounded: a configurable deadline (and optional
//! attempt cap) turns "backend never came up" into a distinct, loud error
//! instead of an indefinitely pending pod.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::error::GateError;

/// Probe loop parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Backend hostname, resolved via service discovery at connect time.
    pub host: String,
    /// Backend TCP port.
    pub port: u16,
    /// Pause between failed probes.
    pub interval: Duration,
    /// Overall budget for the wait. Checked after each failed probe, so a
    /// deadline shorter than one interval still gets one probe.
    pub deadline: Duration,
    /// Cutoff for a single connect attempt, so filtered ports that hang
    /// the SYN do not stall the probe cadence.
    pub connect_timeout: Duration,
    /// Optional hard cap on probe count, checked before the deadline.
    pub max_attempts: Option<u32>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            host: "ollama".to_string(),
            port: crate::backend::DEFAULT_BACKEND_PORT,
            interval: Duration::from_secs(2),
            deadline: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

/// Gate lifecycle. The transition to `Ready` happens exactly once; there
/// is no path back to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Waiting,
    Ready,
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    /// Total probes issued, including the successful one.
    pub attempts: u32,
    /// Probes that failed before the first success.
    pub failed_attempts: u32,
    /// Wall time from first probe to success.
    pub elapsed: Duration,
}

/// Sequential probe/sleep loop against a single backend target.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    config: GateConfig,
}

impl ReadinessGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Issue one connection probe.
    ///
    /// Returns the failure reason as text; callers only branch on
    /// success, the text is for logs.
    pub async fn probe(&self) -> Result<(), String> {
        let target = (self.config.host.as_str(), self.config.port);
        match timeout(self.config.connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "connect timed out after {:?}",
                self.config.connect_timeout
            )),
        }
    }

    /// Block until the backend accepts a connection or the bounds expire.
    ///
    /// One probe runs at a time; each failure logs a single waiting line
    /// and sleeps for the configured interval. The loop is cancelled only
    /// by dropping the future (external termination).
    pub async fn wait(&self) -> Result<GateReport, GateError> {
        let start = Instant::now();
        let mut attempts: u32 = 0;
        let mut state = GateState::Waiting;

        info!(
            host = %self.config.host,
            port = self.config.port,
            deadline = ?self.config.deadline,
            "waiting for backend"
        );

        while state == GateState::Waiting {
            attempts += 1;
            match self.probe().await {
                Ok(()) => {
                    state = GateState::Ready;
                }
                Err(reason) => {
                    warn!(
                        host = %self.config.host,
                        port = self.config.port,
                        attempt = attempts,
                        %reason,
                        "backend not ready, waiting"
                    );

                    if let Some(max) = self.config.max_attempts {
                        if attempts >= max {
                            return Err(GateError::AttemptsExhausted { attempts });
                        }
                    }
                    if start.elapsed() >= self.config.deadline {
                        return Err(GateError::DeadlineExceeded {
                            attempts,
                            elapsed: start.elapsed(),
                        });
                    }

                    sleep(self.config.interval).await;

                    if start.elapsed() >= self.config.deadline {
                        return Err(GateError::DeadlineExceeded {
                            attempts,
                            elapsed: start.elapsed(),
                        });
                    }
                }
            }
        }

        let report = GateReport {
            attempts,
            failed_attempts: attempts - 1,
            elapsed: start.elapsed(),
        };
        info!(
            attempts = report.attempts,
            elapsed = ?report.elapsed,
            "backend ready"
        );
        debug!(state = ?state, "gate open");
        Ok(report)
    }
}
