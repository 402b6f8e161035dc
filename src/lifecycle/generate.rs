//! Artifact generation
//!
//! Rendered content is compared with what is on disk by SHA-256 digest;
//! unchanged artifacts are left alone so repeated runs do not touch files.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::EffectiveConfig;
use crate::render::{ArtifactKind, RenderError, Renderer};
use crate::service::{ServiceError, ServiceManager};
use crate::settings::ArtifactPaths;

/// Artifact errors
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ArtifactError {
    fn io(path: &Path, source: io::Error) -> Self {
        ArtifactError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// What happened to one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Written { digest: String },
    Unchanged { digest: String },
    /// Dry run: rendered but not written
    Rendered { digest: String },
    /// Removed, or would be on a dry run
    Removed,
    Absent,
}

/// Outcome of the generate stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub artifacts: Vec<(ArtifactKind, ArtifactOutcome)>,
    pub daemon_reloaded: bool,
}

impl GenerateReport {
    pub fn outcome(&self, kind: ArtifactKind) -> Option<&ArtifactOutcome> {
        self.artifacts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }
}

/// Errors from the generate stage
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// SHA-256 digest of rendered content
pub fn digest(content: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(content.as_ref()))
}

/// Write `content` to `path` unless it already holds exactly that.
///
/// Parent directories are created; the write goes through a temp file and
/// a rename so readers never see a partial artifact.
pub fn write_artifact(path: &Path, content: &str) -> Result<ArtifactOutcome, ArtifactError> {
    let content_digest = digest(content);

    match fs::read(path) {
        Ok(existing) if digest(&existing) == content_digest => {
            debug!(path = %path.display(), "artifact unchanged");
            return Ok(ArtifactOutcome::Unchanged {
                digest: content_digest,
            });
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(ArtifactError::io(path, e)),
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ArtifactError::io(parent, e))?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| ArtifactError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| ArtifactError::io(path, e))?;

    info!(path = %path.display(), digest = %content_digest, "artifact written");
    Ok(ArtifactOutcome::Written {
        digest: content_digest,
    })
}

/// Remove `path` if it exists
pub fn remove_artifact(path: &Path) -> Result<ArtifactOutcome, ArtifactError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "artifact removed");
            Ok(ArtifactOutcome::Removed)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ArtifactOutcome::Absent),
        Err(e) => Err(ArtifactError::io(path, e)),
    }
}

/// Render and write every artifact, or remove them all when disabled.
pub fn generate(
    config: Option<&EffectiveConfig>,
    paths: &ArtifactPaths,
    renderer: &dyn Renderer,
    services: &dyn ServiceManager,
    dry_run: bool,
) -> Result<GenerateReport, GenerateError> {
    let mut report = GenerateReport::default();

    let Some(config) = config else {
        for kind in ArtifactKind::ALL {
            let path = kind.path(paths);
            let outcome = if dry_run {
                if path.exists() {
                    info!(path = %path.display(), "dry run, would remove");
                    ArtifactOutcome::Removed
                } else {
                    ArtifactOutcome::Absent
                }
            } else {
                remove_artifact(path)?
            };
            report.artifacts.push((kind, outcome));
        }

        // A dropped override fragment is only forgotten after a reload
        if report.outcome(ArtifactKind::SupervisorOverride) == Some(&ArtifactOutcome::Removed) {
            services.daemon_reload()?;
            report.daemon_reloaded = true;
        }
        return Ok(report);
    };

    for kind in ArtifactKind::ALL {
        let content = renderer.render(kind, config).map_err(ArtifactError::from)?;
        let path = kind.path(paths);
        let outcome = if dry_run {
            info!(path = %path.display(), template = kind.template_name(), "dry run, not writing");
            ArtifactOutcome::Rendered {
                digest: digest(&content),
            }
        } else {
            write_artifact(path, &content)?
        };
        report.artifacts.push((kind, outcome));
    }

    services.daemon_reload()?;
    report.daemon_reloaded = true;

    Ok(report)
}
