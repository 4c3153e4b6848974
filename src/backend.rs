//! Typed views of the model backend's environment contract.
//!
//! The backend container is configured through two environment strings:
//! a keep-alive duration (`OLLAMA_KEEP_ALIVE`) and a bind address
//! (`OLLAMA_HOST`). Both are validated here at config load so a bad
//! Secret or ConfigMap fails before the gate starts waiting on a backend
//! that can never come up.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// Default inference port for the model backend.
pub const DEFAULT_BACKEND_PORT: u16 = 11434;

/// How long the backend keeps a loaded model resident after its last use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepAlivePolicy {
    /// Negative value: hold the model in memory indefinitely.
    Forever,
    /// Zero: unload immediately after each request.
    Immediate,
    /// Positive duration: unload after this much idle time.
    Idle(Duration),
}

/// A keep-alive setting, preserving the exact string the backend expects.
///
/// Accepts a bare number of seconds (`300`, `-1`, `0`) or a Go-style
/// duration (`5m`, `24h`, `1h30m`, `500ms`, fractional values allowed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAlive {
    raw: String,
    policy: KeepAlivePolicy,
}

impl KeepAlive {
    pub fn policy(&self) -> &KeepAlivePolicy {
        &self.policy
    }

    /// The exact string to place in the backend's environment.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for KeepAlive {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(invalid_keep_alive(raw, "empty string"));
        }

        // Bare integer means seconds; sign picks the policy.
        if let Ok(n) = raw.parse::<i64>() {
            let policy = match n {
                n if n < 0 => KeepAlivePolicy::Forever,
                0 => KeepAlivePolicy::Immediate,
                n => KeepAlivePolicy::Idle(Duration::from_secs(n as u64)),
            };
            return Ok(Self {
                raw: raw.to_string(),
                policy,
            });
        }

        let (negative, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let total = parse_go_duration(body).map_err(|reason| invalid_keep_alive(raw, reason))?;

        let policy = if negative {
            KeepAlivePolicy::Forever
        } else if total.is_zero() {
            KeepAlivePolicy::Immediate
        } else {
            KeepAlivePolicy::Idle(total)
        };
        Ok(Self {
            raw: raw.to_string(),
            policy,
        })
    }
}

impl fmt::Display for KeepAlive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for KeepAlive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for KeepAlive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

fn invalid_keep_alive(raw: &str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        field: "keep_alive",
        reason: format!("'{raw}': {reason}"),
    }
}

/// Parse a Go-style duration body (no leading sign): `1h30m`, `500ms`, `2.5h`.
fn parse_go_duration(body: &str) -> Result<Duration, String> {
    if body.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = body;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| format!("missing unit after '{rest}'"))?;
        if digits_end == 0 {
            return Err(format!("expected a number at '{rest}'"));
        }
        let value: f64 = rest[..digits_end]
            .parse()
            .map_err(|_| format!("bad number '{}'", &rest[..digits_end]))?;

        rest = &rest[digits_end..];
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let unit_secs = match unit {
            "ns" => 1e-9,
            "us" | "\u{b5}s" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(format!("unknown unit '{unit}'")),
        };
        let segment = Duration::try_from_secs_f64(value * unit_secs)
            .map_err(|_| format!("duration out of range at '{value}{unit}'"))?;
        total = total
            .checked_add(segment)
            .ok_or_else(|| "total duration out of range".to_string())?;
    }
    Ok(total)
}

/// The backend's bind address string, split into host and port.
///
/// Accepts `host:port`, `:port`, a bare host, or any of those behind an
/// `http://`/`https://` prefix. The port defaults to 11434.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindAddr {
    host: String,
    port: u16,
}

impl BindAddr {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for BindAddr {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_BACKEND_PORT,
        }
    }
}

impl FromStr for BindAddr {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let body = raw
            .strip_prefix("http://")
            .or_else(|| raw.strip_prefix("https://"))
            .unwrap_or(raw)
            .trim_end_matches('/');

        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "bind_addr",
            reason: format!("'{raw}': {reason}"),
        };

        let (host, port) = match body.rsplit_once(':') {
            Some((host, port_str)) => {
                let port = port_str
                    .parse::<u16>()
                    .map_err(|_| invalid(format!("bad port '{port_str}'")))?;
                (host, port)
            }
            None => (body, DEFAULT_BACKEND_PORT),
        };

        if host.contains(':') || host.contains('/') {
            return Err(invalid("malformed host".to_string()));
        }

        Ok(Self {
            host: if host.is_empty() {
                "127.0.0.1".to_string()
            } else {
                host.to_string()
            },
            port,
        })
    }
}

impl fmt::Display for BindAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Serialize for BindAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BindAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_alive_negative_means_forever() {
        let ka: KeepAlive = "-1".parse().unwrap();
        assert_eq!(*ka.policy(), KeepAlivePolicy::Forever);
        assert_eq!(ka.as_str(), "-1");
    }

    #[test]
    fn keep_alive_zero_means_immediate_unload() {
        let ka: KeepAlive = "0".parse().unwrap();
        assert_eq!(*ka.policy(), KeepAlivePolicy::Immediate);
    }

    #[test]
    fn keep_alive_bare_number_is_seconds() {
        let ka: KeepAlive = "300".parse().unwrap();
        assert_eq!(
            *ka.policy(),
            KeepAlivePolicy::Idle(Duration::from_secs(300))
        );
    }

    #[test]
    fn keep_alive_go_durations() {
        let ka: KeepAlive = "5m".parse().unwrap();
        assert_eq!(*ka.policy(), KeepAlivePolicy::Idle(Duration::from_secs(300)));

        let ka: KeepAlive = "24h".parse().unwrap();
        assert_eq!(
            *ka.policy(),
            KeepAlivePolicy::Idle(Duration::from_secs(24 * 3600))
        );

        let ka: KeepAlive = "1h30m".parse().unwrap();
        assert_eq!(
            *ka.policy(),
            KeepAlivePolicy::Idle(Duration::from_secs(5400))
        );

        let ka: KeepAlive = "500ms".parse().unwrap();
        assert_eq!(
            *ka.policy(),
            KeepAlivePolicy::Idle(Duration::from_millis(500))
        );
    }

    #[test]
    fn keep_alive_fractional_duration() {
        let ka: KeepAlive = "1.5h".parse().unwrap();
        assert_eq!(
            *ka.policy(),
            KeepAlivePolicy::Idle(Duration::from_secs(5400))
        );
    }

    #[test]
    fn keep_alive_negative_duration_means_forever() {
        let ka: KeepAlive = "-5m".parse().unwrap();
        assert_eq!(*ka.policy(), KeepAlivePolicy::Forever);
    }

    #[test]
    fn keep_alive_preserves_raw_string() {
        let ka: KeepAlive = "24h".parse().unwrap();
        assert_eq!(ka.to_string(), "24h");
    }

    #[test]
    fn keep_alive_rejects_garbage() {
        assert!("".parse::<KeepAlive>().is_err());
        assert!("soon".parse::<KeepAlive>().is_err());
        assert!("5x".parse::<KeepAlive>().is_err());
        assert!("h5".parse::<KeepAlive>().is_err());
    }

    #[test]
    fn keep_alive_rejects_oversized_duration() {
        // A single segment too large for Duration must error, not panic.
        let err = "99999999999999999999999h".parse::<KeepAlive>().unwrap_err();
        assert!(err.to_string().contains("out of range"));

        // Same for segments that only overflow once summed: each fits in
        // a Duration on its own, the total does not.
        assert!("10000000000000000000s10000000000000000000s"
            .parse::<KeepAlive>()
            .is_err());
    }

    #[test]
    fn bind_addr_host_and_port() {
        let addr: BindAddr = "0.0.0.0:11434".parse().unwrap();
        assert_eq!(addr.host(), "0.0.0.0");
        assert_eq!(addr.port(), 11434);
    }

    #[test]
    fn bind_addr_defaults_port() {
        let addr: BindAddr = "ollama".parse().unwrap();
        assert_eq!(addr.host(), "ollama");
        assert_eq!(addr.port(), DEFAULT_BACKEND_PORT);
    }

    #[test]
    fn bind_addr_bare_port() {
        let addr: BindAddr = ":8080".parse().unwrap();
        assert_eq!(addr.host(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn bind_addr_strips_scheme() {
        let addr: BindAddr = "http://ollama:11434/".parse().unwrap();
        assert_eq!(addr.host(), "ollama");
        assert_eq!(addr.port(), 11434);
    }

    #[test]
    fn bind_addr_rejects_bad_port() {
        assert!("ollama:notaport".parse::<BindAddr>().is_err());
        assert!("ollama:99999".parse::<BindAddr>().is_err());
    }

    #[test]
    fn bind_addr_display_round_trip() {
        let addr: BindAddr = "ollama:11434".parse().unwrap();
        assert_eq!(addr.to_string(), "ollama:11434");
    }
}
