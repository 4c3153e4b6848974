//! End-to-end tests driving the spoopaboot binary.

use std::fs;
use std::net::TcpListener;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const SECRET_VARS: [(&str, &str); 6] = [
    ("DISCORD_TOKEN", "discord-test-token"),
    ("SPOTIFY_USERNAME", "spoopa"),
    ("SPOTIFY_CLIENT_ID", "client-id"),
    ("SPOTIFY_CLIENT_SECRET", "client-secret"),
    ("SPOTIFY_REDIRECT_URI", "http://localhost:8888/callback"),
    ("SPOTIFY_PLAYLIST_ID", "playlist-id"),
];

fn spoopaboot() -> Command {
    Command::cargo_bin("spoopaboot").expect("binary builds")
}

fn with_secrets(cmd: &mut Command) -> &mut Command {
    for (name, value) in SECRET_VARS {
        cmd.env(name, value);
    }
    cmd
}

/// A listener held open for the duration of a test. The OS completes TCP
/// handshakes for queued connections without accept() being called.
fn live_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    (listener, port)
}

fn closed_port() -> u16 {
    let (listener, port) = live_listener();
    drop(listener);
    port
}

fn write_run_config(dir: &Path, backend_port: u16, cache_dir: &Path) -> std::path::PathBuf {
    let path = dir.join("spoopaboot.toml");
    let toml = format!(
        "[backend]\nhost = \"127.0.0.1\"\nport = {backend_port}\n\n\
         [gate]\ninterval_secs = 1\ndeadline_secs = 5\nconnect_timeout_secs = 1\n\n\
         [bot]\ncache_dir = \"{}\"\n",
        cache_dir.display()
    );
    fs::write(&path, toml).expect("write config");
    path
}

// wait

#[test]
fn wait_succeeds_against_live_backend() {
    let (_listener, port) = live_listener();

    spoopaboot()
        .args(["wait", "--host", "127.0.0.1", "--deadline", "5"])
        .args(["--port", &port.to_string()])
        .assert()
        .success();
}

#[test]
fn wait_fails_loudly_when_backend_never_comes_up() {
    let port = closed_port();

    spoopaboot()
        .args(["wait", "--host", "127.0.0.1", "--interval", "1", "--deadline", "1"])
        .args(["--port", &port.to_string()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not reachable"));
}

#[test]
fn wait_rejects_zero_deadline() {
    spoopaboot()
        .args(["wait", "--deadline", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("deadline"));
}

#[test]
fn wait_json_mode_reports_attempts() {
    let (_listener, port) = live_listener();

    spoopaboot()
        .args(["--json", "wait", "--host", "127.0.0.1", "--deadline", "5"])
        .args(["--port", &port.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"command\":\"wait\""))
        .stdout(predicate::str::contains("\"status\":\"ready\""));
}

// check

#[test]
fn check_env_reports_missing_secret_names() {
    let mut cmd = spoopaboot();
    for (name, _) in SECRET_VARS {
        cmd.env_remove(name);
    }
    cmd.args(["check", "env"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DISCORD_TOKEN"));
}

#[test]
fn check_env_passes_with_all_secrets() {
    let mut cmd = spoopaboot();
    with_secrets(&mut cmd)
        .args(["check", "env"])
        .assert()
        .success();
}

#[test]
fn check_backend_fails_against_closed_port() {
    let port = closed_port();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_run_config(dir.path(), port, dir.path());

    spoopaboot()
        .args(["check", "backend", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unreachable"));
}

// config

#[test]
fn config_init_then_validate_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("spoopaboot.toml");

    spoopaboot()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .success();

    spoopaboot()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("spoopaboot.toml");
    fs::write(&path, "# existing\n").expect("write");

    spoopaboot()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&path).unwrap(), "# existing\n");
}

#[test]
fn config_validate_reports_invalid_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("spoopaboot.toml");
    fs::write(&path, "[gate]\ndeadline_secs = 0\n").expect("write");

    spoopaboot()
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("deadline_secs"));
}

// run

#[test]
fn run_fails_fast_on_missing_secrets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_listener, port) = live_listener();
    let config = write_run_config(dir.path(), port, dir.path());

    let mut cmd = spoopaboot();
    with_secrets(&mut cmd);
    cmd.env_remove("SPOTIFY_CLIENT_SECRET");
    cmd.args(["run", "--config"])
        .arg(&config)
        .args(["--", "true"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SPOTIFY_CLIENT_SECRET"));
}

#[test]
fn run_gates_seeds_cache_and_launches_bot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache_dir = dir.path().join("cache");
    let (_listener, port) = live_listener();
    let config = write_run_config(dir.path(), port, &cache_dir);

    let mut cmd = spoopaboot();
    with_secrets(&mut cmd);
    cmd.env("TOKEN_CACHE", "{\"opaque\":\"token\"}");
    cmd.args(["run", "--config"])
        .arg(&config)
        .args(["--", "true"])
        .assert()
        .success();

    let seeded = fs::read_to_string(cache_dir.join(".cache-spoopa")).expect("cache file");
    assert_eq!(seeded, "{\"opaque\":\"token\"}");
}

#[test]
fn run_propagates_bot_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_listener, port) = live_listener();
    let config = write_run_config(dir.path(), port, dir.path());

    let mut cmd = spoopaboot();
    with_secrets(&mut cmd);
    cmd.args(["run", "--config"])
        .arg(&config)
        .args(["--", "sh", "-c", "exit 5"])
        .assert()
        .code(5);
}

#[test]
fn run_without_any_bot_command_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_listener, port) = live_listener();
    let config = write_run_config(dir.path(), port, dir.path());

    let mut cmd = spoopaboot();
    with_secrets(&mut cmd);
    cmd.args(["run", "--skip-gate", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no bot command"));
}
