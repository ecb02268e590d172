use crate::config::DependencyConfig;
use crate::error::BootstrapError;
use crate::service::manifest::Manifest;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs the external package tool against a manifest.
///
/// stdout/stderr are inherited, so the tool's own output is what the user sees on failure.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
}

impl CommandInstaller {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(cfg: &DependencyConfig) -> Self {
        Self::new(cfg.installer.clone(), cfg.installer_args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns `false` when the manifest was already trivially satisfied and nothing ran.
    pub async fn install(&self, manifest: &Manifest) -> Result<bool, BootstrapError> {
        if manifest.is_empty() {
            info!(path = %manifest.path.display(), "manifest lists no packages; skipping installer");
            return Ok(false);
        }

        debug!(
            program = %self.program,
            args = ?self.args,
            manifest = %manifest.path.display(),
            "invoking installer"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&manifest.path)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| BootstrapError::InstallerLaunch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(BootstrapError::InstallerFailed {
                program: self.program.clone(),
                code: status.code(),
            });
        }
        Ok(true)
    }
}
