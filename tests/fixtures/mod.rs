//! Shared helpers for commit-cycle tests

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use syslog_conf::settings::{ArtifactPaths, Settings};

/// Settings with every artifact and the interface root inside `dir`
pub fn settings_in(dir: &Path) -> Settings {
    let interface_root = dir.join("sys/class/net");
    fs::create_dir_all(&interface_root).unwrap();

    Settings {
        artifacts: ArtifactPaths {
            daemon_config: dir.join("etc/rsyslog.d/00-syslog-conf.conf"),
            supervisor_override: dir.join("run/systemd/system/rsyslog.service.d/override.conf"),
            logrotate: dir.join("etc/logrotate.d/syslog-conf"),
        },
        interface_root,
        user_log_dir: PathBuf::from("/var/log/user"),
        ..Settings::default()
    }
}

/// Pretend a network device exists
pub fn add_interface(settings: &Settings, name: &str) {
    fs::create_dir_all(settings.interface_root.join(name)).unwrap();
}

/// Write a snapshot as JSON and return its path
pub fn write_snapshot(dir: &Path, name: &str, tree: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(tree).unwrap()).unwrap();
    path
}
