//! End-to-end reload tests: a driver notices a deleted template and the
//! coordinator cascades the removal into the store.

use confcache::reload::{start_driver, ReloadMode, ReloadState};
use confcache::store::{ConfigStore, MockKv, RemoteTtlBackend};
use confcache::{ReloadCoordinator, TemplateRegistry};
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const SUFFIX: &str = ".conf.tmpl";

fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    condition()
}

fn run_driver(mode: ReloadMode, store: ConfigStore) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.conf.tmpl"), "a ${x}").unwrap();
    fs::write(temp.path().join("b.conf.tmpl"), "b ${x}").unwrap();
    let registry = Arc::new(TemplateRegistry::load(temp.path(), SUFFIX).unwrap());

    store.set_with_template("cfg1", "from a", "a").unwrap();
    store.set_with_template("cfg2", "from b", "b").unwrap();

    let handle = ReloadCoordinator::new(registry.clone(), store.clone(), temp.path()).spawn();
    let driver = start_driver(
        mode,
        temp.path(),
        SUFFIX,
        Duration::from_millis(50),
        handle.requester(),
    )
    .unwrap()
    .expect("driver should start");

    fs::remove_file(temp.path().join("a.conf.tmpl")).unwrap();

    assert!(
        wait_for(Duration::from_secs(10), || store.get("cfg1").is_err()),
        "{mode} driver never cascaded the removal"
    );
    assert!(!registry.contains("a"));
    assert_eq!(store.get("cfg2").unwrap(), "from b");

    driver.stop();
    handle.shutdown();
}

#[test]
fn poll_driver_cascades_removed_template() {
    run_driver(ReloadMode::Poll, ConfigStore::in_memory("acme"));
}

#[test]
fn poll_driver_cascades_on_remote_backend() {
    let backend = RemoteTtlBackend::new(MockKv::new()).with_scan_count(1);
    run_driver(ReloadMode::Poll, ConfigStore::new("acme", Arc::new(backend)));
}

#[test]
fn watch_driver_cascades_removed_template() {
    run_driver(ReloadMode::Watch, ConfigStore::in_memory("acme"));
}

#[test]
fn new_template_is_picked_up() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(TemplateRegistry::load(temp.path(), SUFFIX).unwrap());
    assert!(registry.is_empty());

    let handle =
        ReloadCoordinator::new(registry.clone(), ConfigStore::in_memory("acme"), temp.path())
            .spawn();
    let driver = start_driver(
        ReloadMode::Poll,
        temp.path(),
        SUFFIX,
        Duration::from_millis(50),
        handle.requester(),
    )
    .unwrap()
    .expect("driver should start");

    fs::write(temp.path().join("nginx.conf.tmpl"), "listen ${port};").unwrap();
    assert!(wait_for(Duration::from_secs(5), || registry.contains("nginx")));

    driver.stop();
    handle.shutdown();
}

#[test]
fn broken_template_leaves_coordinator_serving() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.conf.tmpl"), "a").unwrap();
    let registry = Arc::new(TemplateRegistry::load(temp.path(), SUFFIX).unwrap());
    let handle =
        ReloadCoordinator::new(registry.clone(), ConfigStore::in_memory("acme"), temp.path())
            .spawn();

    fs::write(temp.path().join("bad.conf.tmpl"), "${").unwrap();
    handle.requester().request();
    assert!(wait_for(Duration::from_secs(5), || {
        handle.state() == ReloadState::Failed
    }));
    assert!(registry.contains("a"));

    fs::remove_file(temp.path().join("bad.conf.tmpl")).unwrap();
    handle.requester().request();
    assert!(wait_for(Duration::from_secs(5), || {
        handle.state() == ReloadState::Idle && registry.generation() >= 2
    }));

    handle.shutdown();
}
