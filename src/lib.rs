//! Spoopaboot - startup supervisor for the spoopafu bot deployment.
//!
//! The bot pod depends on a model-serving backend (Ollama) that comes up
//! on its own schedule. This crate replaces the deployment's shell-loop
//! init container with a typed, bounded startup sequence:
//!
//! - [`gate`] - readiness gate that blocks until the backend accepts TCP
//!   connections, with a deadline that fails loudly instead of waiting
//!   forever
//! - [`config`] - TOML + environment configuration, including the
//!   injected secret contract, validated eagerly at startup
//! - [`backend`] - typed views of the backend's environment contract
//!   (keep-alive duration, bind address)
//! - [`cache`] - existence-gated seeding of the opaque OAuth token cache
//! - [`launcher`] - bot process spawn/supervision and the keepalive pinger
//! - [`cli`] - the `spoopaboot` command surface
//!
//! # Example
//!
//! ```no_run
//! use spoopaboot::gate::{GateConfig, ReadinessGate};
//!
//! # async fn demo() -> Result<(), spoopaboot::error::GateError> {
//! let gate = ReadinessGate::new(GateConfig::default());
//! let report = gate.wait().await?;
//! println!("backend ready after {} probes", report.attempts);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod launcher;
