//! verify → generate → apply
//!
//! Each stage consumes the resolved configuration, `None` meaning the
//! feature is disabled. Stages run strictly in order and the first failure
//! ends the cycle.

mod apply;
mod generate;
mod verify;

use thiserror::Error;
use tracing::info;

pub use apply::apply;
pub use generate::{
    digest, generate, remove_artifact, write_artifact, ArtifactError, ArtifactOutcome,
    GenerateError, GenerateReport,
};
pub use verify::{verify, ConfigurationError, StaticVrfCatalog, SysfsVrfCatalog, VrfCatalog};

use crate::config::EffectiveConfig;
use crate::render::Renderer;
use crate::service::{ServiceError, ServiceManager, UnitAction};
use crate::settings::Settings;
use crate::store::StoreError;

/// Errors that end a commit
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("snapshot error: {0}")]
    Store(#[from] StoreError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("service manager error: {0}")]
    Service(#[from] ServiceError),

    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<GenerateError> for LifecycleError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Artifact(e) => LifecycleError::Artifact(e),
            GenerateError::Service(e) => LifecycleError::Service(e),
        }
    }
}

impl LifecycleError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleError::Configuration(_) => 1,
            LifecycleError::Store(_) => 2,
            LifecycleError::Service(_) => 69,
            LifecycleError::Output(_) => 70,
            LifecycleError::Artifact(_) => 74,
        }
    }
}

/// Outcome of a full cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub generate: GenerateReport,
    pub action: UnitAction,
}

/// The collaborators the stages need
pub struct Lifecycle<'a> {
    settings: &'a Settings,
    renderer: &'a dyn Renderer,
    services: &'a dyn ServiceManager,
    vrfs: &'a dyn VrfCatalog,
    dry_run: bool,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        settings: &'a Settings,
        renderer: &'a dyn Renderer,
        services: &'a dyn ServiceManager,
        vrfs: &'a dyn VrfCatalog,
    ) -> Self {
        Self {
            settings,
            renderer,
            services,
            vrfs,
            dry_run: false,
        }
    }

    /// Render without writing artifacts
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn verify(&self, config: Option<&EffectiveConfig>) -> Result<(), ConfigurationError> {
        verify(config, self.vrfs)
    }

    pub fn generate(&self, config: Option<&EffectiveConfig>) -> Result<GenerateReport, GenerateError> {
        generate(
            config,
            &self.settings.artifacts,
            self.renderer,
            self.services,
            self.dry_run,
        )
    }

    pub fn apply(&self, config: Option<&EffectiveConfig>) -> Result<UnitAction, ServiceError> {
        apply(config, &self.settings.units, self.services)
    }

    /// Run all three stages in order
    pub fn run(&self, config: Option<&EffectiveConfig>) -> Result<CommitReport, LifecycleError> {
        let state = if config.is_some() { "enabled" } else { "disabled" };
        info!(state, dry_run = self.dry_run, "committing syslog configuration");

        self.verify(config)?;
        let generate = self.generate(config)?;
        let action = self.apply(config)?;

        Ok(CommitReport { generate, action })
    }
}
