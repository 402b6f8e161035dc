//! syslog-conf - system syslog configuration
//!
//! Resolves the `system syslog` configuration tree against schema defaults,
//! detects binding changes that need a restart, renders the daemon's
//! artifacts and drives the service manager.

pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod render;
pub mod service;
pub mod settings;
pub mod store;

pub use config::{ConfigResolver, EffectiveConfig, SchemaDefaults};
pub use lifecycle::{ConfigurationError, Lifecycle, LifecycleError};
pub use render::{ArtifactKind, BuiltinRenderer, Renderer};
pub use service::{RecordingServiceManager, ServiceManager, Systemctl, UnitAction};
pub use settings::Settings;
pub use store::SnapshotStore;
