//! Artifact rendering
//!
//! Each artifact is identified by the template it is produced from. The
//! built-in renderer emits rsyslog, systemd and logrotate syntax directly.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::EffectiveConfig;
use crate::settings::ArtifactPaths;

/// Rendered artifacts, in generation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    DaemonConfig,
    SupervisorOverride,
    LogRotate,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::DaemonConfig,
        ArtifactKind::SupervisorOverride,
        ArtifactKind::LogRotate,
    ];

    pub fn template_name(&self) -> &'static str {
        match self {
            ArtifactKind::DaemonConfig => "rsyslog/rsyslog.conf",
            ArtifactKind::SupervisorOverride => "rsyslog/override.conf",
            ArtifactKind::LogRotate => "rsyslog/logrotate",
        }
    }

    pub fn path<'a>(&self, paths: &'a ArtifactPaths) -> &'a Path {
        match self {
            ArtifactKind::DaemonConfig => &paths.daemon_config,
            ArtifactKind::SupervisorOverride => &paths.supervisor_override,
            ArtifactKind::LogRotate => &paths.logrotate,
        }
    }
}

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{template}: missing value {path}")]
    MissingValue {
        template: &'static str,
        path: String,
    },

    #[error("{template}: invalid log file name {name:?}")]
    InvalidFileName {
        template: &'static str,
        name: String,
    },
}

/// Produces artifact text from an effective configuration
pub trait Renderer {
    fn render(&self, kind: ArtifactKind, config: &EffectiveConfig) -> Result<String, RenderError>;
}

const HEADER: &str = "### Autogenerated by syslog-conf, do not edit ###\n";

const RSYSLOGD: &str = "/usr/sbin/rsyslogd -n -iNONE";

/// Renders rsyslog configuration without external templates
#[derive(Debug, Clone)]
pub struct BuiltinRenderer {
    /// Directory holding `file <name>` logs
    pub user_log_dir: PathBuf,

    /// Catch-all log written by `global` facilities
    pub messages_log: PathBuf,
}

impl Default for BuiltinRenderer {
    fn default() -> Self {
        Self {
            user_log_dir: PathBuf::from("/var/log/user"),
            messages_log: PathBuf::from("/var/log/messages"),
        }
    }
}

impl Renderer for BuiltinRenderer {
    fn render(&self, kind: ArtifactKind, config: &EffectiveConfig) -> Result<String, RenderError> {
        match kind {
            ArtifactKind::DaemonConfig => self.daemon_config(config),
            ArtifactKind::SupervisorOverride => Ok(supervisor_override(config)),
            ArtifactKind::LogRotate => self.logrotate(config),
        }
    }
}

impl BuiltinRenderer {
    fn daemon_config(&self, config: &EffectiveConfig) -> Result<String, RenderError> {
        let template = ArtifactKind::DaemonConfig.template_name();
        let mut out = String::from(HEADER);

        if let Some(interval) = config.get_u64("global.marker.interval") {
            out.push_str("$ModLoad immark\n");
            out.push_str(&format!("$MarkMessagePeriod {}\n", interval));
        }
        if config.has("global.preserve_fqdn") {
            out.push_str("$PreserveFQDN on\n");
        }

        if let Some(global) = config.get("global") {
            out.push_str("\n# Global\n");
            push_rule(&mut out, global, &self.messages_log.display().to_string());
        }

        if let Some(console) = config.get("console") {
            out.push_str("\n# Console\n");
            push_rule(&mut out, console, "/dev/console");
        }

        for (name, file) in config.instances("file") {
            out.push_str(&format!("\n# File {}\n", name));
            let target = self.user_log_path(template, name)?;
            push_rule(&mut out, file, &target.display().to_string());
        }

        for (name, host) in config.instances("host") {
            out.push_str(&format!("\n# Remote host {}\n", name));
            let port = host
                .get("port")
                .and_then(Value::as_u64)
                .ok_or_else(|| RenderError::MissingValue {
                    template,
                    path: format!("host.{}.port", name),
                })?;
            let octet_counted = host.pointer("/format/octet_counted").is_some();
            for (facility, options) in facilities(host) {
                let level = options.get("level").and_then(Value::as_str);
                let protocol = options
                    .get("protocol")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RenderError::MissingValue {
                        template,
                        path: format!("host.{}.facility.{}.protocol", name, facility),
                    })?;
                let prefix = match (protocol, octet_counted) {
                    ("tcp", true) => "@@(o)",
                    ("tcp", false) => "@@",
                    _ => "@",
                };
                out.push_str(&format!(
                    "{} {}{}:{}\n",
                    selector(facility, level),
                    prefix,
                    remote_address(name),
                    port
                ));
            }
        }

        for (name, user) in config.instances("user") {
            out.push_str(&format!("\n# User {}\n", name));
            push_rule(&mut out, user, &format!(":omusrmsg:{}", name));
        }

        Ok(out)
    }

    fn logrotate(&self, config: &EffectiveConfig) -> Result<String, RenderError> {
        let template = ArtifactKind::LogRotate.template_name();
        let mut out = String::from(HEADER);

        let mut logs = Vec::new();
        if let Some(global) = config.get("global") {
            logs.push((self.messages_log.clone(), global.get("archive")));
        }
        for (name, file) in config.instances("file") {
            logs.push((self.user_log_path(template, name)?, file.get("archive")));
        }

        for (path, archive) in logs {
            out.push_str(&format!("\n{} {{\n", path.display()));
            out.push_str("    missingok\n    notifempty\n    create\n");
            if let Some(rotate) = archive.and_then(|a| a.get("file")).and_then(Value::as_u64) {
                out.push_str(&format!("    rotate {}\n", rotate));
            }
            if let Some(size) = archive.and_then(|a| a.get("size")).and_then(Value::as_u64) {
                out.push_str(&format!("    size={}k\n", size));
            }
            out.push_str("    postrotate\n");
            out.push_str("        /usr/lib/rsyslog/rsyslog-rotate\n");
            out.push_str("    endscript\n}\n");
        }

        Ok(out)
    }

    /// `file <name>` log path; the name must stay inside `user_log_dir`
    fn user_log_path(&self, template: &'static str, name: &str) -> Result<PathBuf, RenderError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(RenderError::InvalidFileName {
                template,
                name: name.to_string(),
            });
        }
        Ok(self.user_log_dir.join(name))
    }
}

fn supervisor_override(config: &EffectiveConfig) -> String {
    let exec = match config.vrfs().first() {
        Some(vrf) => format!("/sbin/ip vrf exec {} {}", vrf, RSYSLOGD),
        None => RSYSLOGD.to_string(),
    };
    format!(
        "{}[Unit]\nStartLimitIntervalSec=0\n\n[Service]\nExecStart=\nExecStart={}\nRestart=always\n",
        HEADER, exec
    )
}

fn facilities(node: &Value) -> Vec<(&str, &Value)> {
    match node.get("facility") {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        _ => Vec::new(),
    }
}

/// `facility.level` selector; `all` maps to rsyslog's wildcard
fn selector(facility: &str, level: Option<&str>) -> String {
    let wildcard = |name: &str| if name == "all" { "*".to_string() } else { name.to_string() };
    format!("{}.{}", wildcard(facility), wildcard(level.unwrap_or("all")))
}

fn push_rule(out: &mut String, node: &Value, target: &str) {
    let selectors: Vec<String> = facilities(node)
        .into_iter()
        .map(|(facility, options)| {
            selector(facility, options.get("level").and_then(Value::as_str))
        })
        .collect();
    if !selectors.is_empty() {
        out.push_str(&format!("{} {}\n", selectors.join(";"), target));
    }
}

fn remote_address(host: &str) -> String {
    if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}
