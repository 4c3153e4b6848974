//! Token cache seeding.
//!
//! The bot keeps its OAuth token cache at `.cache-<username>` inside the
//! mounted cache volume. The file's content is an opaque external
//! dependency: spoopaboot writes the `TOKEN_CACHE` environment value into
//! it verbatim when absent and otherwise leaves it alone. It never reads
//! or rewrites an existing cache file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;

/// What happened during a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Cache file was created from the provided seed content.
    Seeded,
    /// Cache file already exists; left untouched.
    AlreadyPresent,
    /// No cache file and no seed content. The bot's one-time `--auth`
    /// flow has to create it interactively.
    NoSeed,
}

/// Path of the token cache file for a Spotify username.
pub fn cache_file_path(cache_dir: &Path, username: &str) -> PathBuf {
    cache_dir.join(format!(".cache-{username}"))
}

/// Seed the token cache file if it does not exist yet.
pub fn seed_token_cache(
    cache_dir: &Path,
    username: &str,
    seed: Option<&str>,
) -> Result<SeedOutcome> {
    let path = cache_file_path(cache_dir, username);

    if path.exists() {
        info!(path = %path.display(), "token cache already present");
        return Ok(SeedOutcome::AlreadyPresent);
    }

    match seed {
        Some(content) => {
            fs::create_dir_all(cache_dir)?;
            fs::write(&path, content)?;
            info!(path = %path.display(), "token cache seeded from environment");
            Ok(SeedOutcome::Seeded)
        }
        None => {
            warn!(
                path = %path.display(),
                "TOKEN_CACHE not set and no cache file present; run the bot with --auth once"
            );
            Ok(SeedOutcome::NoSeed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_absent_file_with_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = seed_token_cache(dir.path(), "spoopa", Some("{\"opaque\": true}")).unwrap();
        assert_eq!(outcome, SeedOutcome::Seeded);

        let written = fs::read_to_string(dir.path().join(".cache-spoopa")).unwrap();
        assert_eq!(written, "{\"opaque\": true}");
    }

    #[test]
    fn never_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_file_path(dir.path(), "spoopa");
        fs::write(&path, "original").unwrap();

        let outcome = seed_token_cache(dir.path(), "spoopa", Some("replacement")).unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyPresent);
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn missing_seed_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = seed_token_cache(dir.path(), "spoopa", None).unwrap();
        assert_eq!(outcome, SeedOutcome::NoSeed);
        assert!(!cache_file_path(dir.path(), "spoopa").exists());
    }

    #[test]
    fn creates_cache_dir_when_seeding() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cache");
        let outcome = seed_token_cache(&nested, "spoopa", Some("blob")).unwrap();
        assert_eq!(outcome, SeedOutcome::Seeded);
        assert!(cache_file_path(&nested, "spoopa").exists());
    }

    #[test]
    fn cache_path_includes_username() {
        let path = cache_file_path(Path::new("/cache"), "spoopa");
        assert_eq!(path, PathBuf::from("/cache/.cache-spoopa"));
    }
}
