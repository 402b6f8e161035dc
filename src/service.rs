//! Service manager control
//!
//! Abstracts the service manager for testability. Provides:
//! - ServiceManager trait: the verbs the lifecycle needs
//! - Systemctl: runs `systemctl` for production
//! - RecordingServiceManager: records calls for tests and dry runs

use std::cell::RefCell;
use std::fmt;
use std::process::Command;

use tracing::{debug, info};

/// Unit verbs issued by the apply stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitAction {
    Stop,
    ReloadOrRestart,
    Restart,
}

impl UnitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitAction::Stop => "stop",
            UnitAction::ReloadOrRestart => "reload-or-restart",
            UnitAction::Restart => "restart",
        }
    }
}

impl fmt::Display for UnitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service manager errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    Failed { command: String, status: String },
}

/// Service manager interface
pub trait ServiceManager {
    /// Apply `action` to `units`
    fn control(&self, action: UnitAction, units: &[&str]) -> Result<(), ServiceError>;

    /// Re-read unit definitions after override fragments changed
    fn daemon_reload(&self) -> Result<(), ServiceError>;
}

/// `systemctl` on the local host
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self {
            program: "systemctl".to_string(),
        }
    }
}

impl Systemctl {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<(), ServiceError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(%command, "running service manager");

        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|source| ServiceError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ServiceError::Failed {
                command,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

impl ServiceManager for Systemctl {
    fn control(&self, action: UnitAction, units: &[&str]) -> Result<(), ServiceError> {
        info!(%action, units = %units.join(" "), "service action");
        let args: Vec<&str> = std::iter::once(action.as_str())
            .chain(units.iter().copied())
            .collect();
        self.run(&args)
    }

    fn daemon_reload(&self) -> Result<(), ServiceError> {
        info!("reloading unit definitions");
        self.run(&["daemon-reload"])
    }
}

/// Records every call as the equivalent `systemctl` argument string
#[derive(Debug, Default)]
pub struct RecordingServiceManager {
    calls: RefCell<Vec<String>>,
}

impl RecordingServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, e.g. `"restart syslog.service"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ServiceManager for RecordingServiceManager {
    fn control(&self, action: UnitAction, units: &[&str]) -> Result<(), ServiceError> {
        let call = format!("{} {}", action, units.join(" "));
        info!(%call, "recorded service action");
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    fn daemon_reload(&self) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push("daemon-reload".to_string());
        Ok(())
    }
}
