//! Path utilities for spoopaboot.
//!
//! Outside the container the config lives under `~/.spoopaboot/`; inside
//! the deployment it is mounted wherever the pod spec says and passed via
//! `--config`.

use std::path::PathBuf;

/// Returns the spoopaboot home directory (`~/.spoopaboot/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".spoopaboot")
}

/// Returns the default config file path (`~/.spoopaboot/spoopaboot.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("spoopaboot.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_spoopaboot_home() {
        let home = home_dir();
        let config = default_config();

        assert!(home.to_string_lossy().contains(".spoopaboot"));
        assert!(config.to_string_lossy().contains(".spoopaboot"));
    }
}
