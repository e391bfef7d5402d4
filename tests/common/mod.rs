#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use media_bridge::agent::config::Config;
use media_bridge::commands::TimeoutStrategy;
use tempfile::TempDir;

/// Write an executable shell script standing in for the media-control program
pub fn stub(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stub that prints the title/artist payload in two separate writes
pub fn chunked_status_stub(dir: &TempDir) -> PathBuf {
    stub(
        dir,
        "chunked",
        r#"printf '{"title":"Song A",'
sleep 0.2
printf '"artist":"Artist B"}'"#,
    )
}

/// Stub that never writes and never exits on its own
pub fn silent_stub(dir: &TempDir) -> PathBuf {
    stub(dir, "silent", "exec sleep 30")
}

/// Stub that appends its argument to `log` and echoes it back
pub fn recording_stub(dir: &TempDir, log: &Path) -> PathBuf {
    stub(
        dir,
        "recorder",
        &format!("echo \"$1\" >> '{}'\necho \"$1\"", log.display()),
    )
}

pub fn config_for(executable: &Path) -> Config {
    Config {
        executable: executable.to_path_buf(),
        status_timeout: TimeoutStrategy::from_millis(1_000),
        action_timeout: TimeoutStrategy::from_millis(2_000),
        ..Config::default()
    }
}
