//! Ordered, fail-fast bootstrap pipeline.
//!
//! Each step is independently idempotent. The first failing step stops the run;
//! side effects of the steps before it are kept.

use crate::config::Config;
use crate::db::{SchemaState, SchemaStore, SeedPlan, StoreTarget};
use crate::error::BootstrapError;
use crate::service::{CommandInstaller, DirOutcome, Manifest, ensure_dir};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns a short summary for the report.
    async fn run(&self) -> Result<String, BootstrapError>;
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: &'static str,
    pub summary: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub steps: Vec<StepReport>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Bootstrap {
    steps: Vec<Box<dyn Step>>,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// dependencies -> uploads -> schema
    pub fn from_config(cfg: &Config) -> Result<Self, BootstrapError> {
        let target = StoreTarget::resolve(&cfg.database)?;
        Ok(Self::new()
            .with_step(DependencyStep {
                manifest: cfg.dependencies.manifest.clone(),
                installer: CommandInstaller::from_config(&cfg.dependencies),
            })
            .with_step(UploadDirStep {
                dir: cfg.uploads.dir.clone(),
            })
            .with_step(SchemaStep {
                target,
                seed: SeedPlan::from_config(&cfg.database),
            }))
    }

    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self) -> Result<BootstrapReport, BootstrapError> {
        let mut reports = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let name = step.name();
            info!(step = name, "starting");
            let started = Instant::now();

            let summary = step.run().await.inspect_err(|e| {
                error!(step = name, error = %e, "step failed; aborting bootstrap");
            })?;

            let elapsed = started.elapsed();
            info!(step = name, elapsed_ms = elapsed.as_millis() as u64, %summary, "done");
            reports.push(StepReport {
                name,
                summary,
                elapsed,
            });
        }

        Ok(BootstrapReport {
            steps: reports,
            finished_at: Utc::now(),
        })
    }
}

pub struct DependencyStep {
    pub manifest: PathBuf,
    pub installer: CommandInstaller,
}

#[async_trait]
impl Step for DependencyStep {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    async fn run(&self) -> Result<String, BootstrapError> {
        let manifest = Manifest::load(&self.manifest).await?;
        info!(
            path = %manifest.path.display(),
            packages = manifest.requirements.len(),
            directives = manifest.directives.len(),
            "manifest parsed"
        );
        let ran = self.installer.install(&manifest).await?;
        Ok(if ran {
            format!(
                "{} package(s) installed with {}",
                manifest.requirements.len(),
                self.installer.program()
            )
        } else {
            "nothing to install".to_string()
        })
    }
}

pub struct UploadDirStep {
    pub dir: PathBuf,
}

#[async_trait]
impl Step for UploadDirStep {
    fn name(&self) -> &'static str {
        "uploads"
    }

    async fn run(&self) -> Result<String, BootstrapError> {
        let outcome = ensure_dir(&self.dir).await?;
        Ok(match outcome {
            DirOutcome::Created => format!("created {}", self.dir.display()),
            DirOutcome::Existing => format!("{} already present", self.dir.display()),
        })
    }
}

pub struct SchemaStep {
    pub target: StoreTarget,
    pub seed: Option<SeedPlan>,
}

#[async_trait]
impl Step for SchemaStep {
    fn name(&self) -> &'static str {
        "schema"
    }

    async fn run(&self) -> Result<String, BootstrapError> {
        info!(store = %self.target, "initializing schema");
        let store = SchemaStore::connect(&self.target).await?;
        let result = store.initialize(self.seed.as_ref()).await;
        store.close().await;
        let outcome = result?;

        Ok(match outcome.previous {
            SchemaState::Uninitialized => format!(
                "schema created ({} constituencies seeded{})",
                outcome.constituencies_added,
                if outcome.admin_created {
                    ", default admin added"
                } else {
                    ""
                }
            ),
            SchemaState::Ready => "schema already ready".to_string(),
        })
    }
}
