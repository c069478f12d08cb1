//! Integration tests for the confcache binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_templates() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("conf");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("nginx.conf.tmpl"), "listen ${port};\n").unwrap();
    fs::write(dir.join("redis.conf.tmpl"), "port 6379\n").unwrap();
    temp
}

fn confcache(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("confcache"));
    cmd.current_dir(temp.path())
        .env_remove("ORG_NAME")
        .env_remove("USE_REDIS")
        .env_remove("REDIS_URL")
        .env_remove("REDIS_TTL")
        .env_remove("CONFCACHE_TEMPLATE_DIR")
        .env_remove("CONFCACHE_RELOAD_INTERVAL")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("confcache"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("render configs from templates"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("confcache"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("confcache"));
    cmd.assert().failure();
    Ok(())
}

#[test]
fn cli_lists_templates() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("nginx"))
        .stdout(predicate::str::contains("redis"));
    Ok(())
}

#[test]
fn cli_templates_flag_overrides_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new().unwrap();
    let other = temp.path().join("elsewhere");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("haproxy.conf.tmpl"), "x").unwrap();

    confcache(&temp)
        .args(["templates", "--json", "--templates"])
        .arg(&other)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"haproxy\""));
    Ok(())
}

#[test]
fn cli_renders_template() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["render", "nginx", "--id", "web1", "--set", "port=8080"])
        .assert()
        .success()
        .stdout(predicate::str::contains("listen 8080;"));
    Ok(())
}

#[test]
fn cli_render_unknown_template_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["render", "haproxy", "--id", "lb1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown template 'haproxy'"));
    Ok(())
}

#[test]
fn cli_render_missing_variable_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["render", "nginx", "--id", "web1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("port"));
    Ok(())
}

#[test]
fn cli_reads_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    fs::rename(temp.path().join("conf"), temp.path().join("tmpl")).unwrap();
    fs::write(
        temp.path().join("confcache.yml"),
        "organization: acme\ntemplates:\n  directory: tmpl\n",
    )
    .unwrap();

    confcache(&temp)
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("nginx"));
    Ok(())
}

#[test]
fn cli_missing_explicit_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["--config", "nope.yml", "templates"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn cli_invalid_org_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["list", "--org", "{bad}"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn cli_get_missing_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["get", "web1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No cached config 'web1'"));
    Ok(())
}

#[test]
fn cli_invalidate_reports_count() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["invalidate", "nginx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0 config(s)"));
    Ok(())
}

#[test]
fn cli_watch_stops_after_duration() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["watch", "--mode", "poll", "--interval", "100ms", "--duration", "300ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped after"));
    Ok(())
}

#[test]
fn cli_generates_completions() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_templates();
    confcache(&temp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("confcache"));
    Ok(())
}
