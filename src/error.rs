use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Readiness gate failures.
///
/// Both variants mean the backend never accepted a connection within the
/// configured bounds. They are distinct from "still waiting": the gate
/// always terminates with success or one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("backend not reachable within {elapsed:?} ({attempts} probes failed)")]
    DeadlineExceeded { attempts: u32, elapsed: Duration },

    #[error("backend not reachable after {attempts} probes")]
    AttemptsExhausted { attempts: u32 },
}

/// Errors from launching and supervising the bot process.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("no bot command configured: set [bot].command or pass one after `--`")]
    NoCommand,

    #[error("failed to spawn bot command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bot exited with status {code}")]
    NonZeroExit { code: i32 },

    #[error("bot terminated by signal")]
    Killed,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("check failed: {0}")]
    CheckFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit code for this error.
    ///
    /// Gate timeouts get their own code so orchestrator logs can tell
    /// "backend never came up" apart from misconfiguration.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Gate(_) => 3,
            Error::Launch(LaunchError::NonZeroExit { code }) => *code,
            _ => 1,
        }
    }
}
