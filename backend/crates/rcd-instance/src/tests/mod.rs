
use rcd_config::Config;

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable shell script.
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Config rooted at `dir` with fast polling.
pub(crate) fn test_config(dir: &Path) -> Config {
    let mut config = Config::load_from(dir).unwrap();
    config.readiness.poll_interval_ms = 20;
    config.readiness.empty_pid_grace_ms = 20;
    config.memory_checker.binary = String::from("rcd-test-no-such-memory-checker");
    config
}
