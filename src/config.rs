//! Process configuration, loaded once at startup and passed to every step.
//!
//! Layers (later wins): built-in defaults, `bootstrap.toml`, `BOOTSTRAP_*`
//! environment variables (`__` separates nested keys), and `DATABASE_URL`.

use crate::error::BootstrapError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "bootstrap.toml";

/// Environment marker set by the hosting platform; makes `DATABASE_URL` mandatory.
const HOSTED_MARKER: &str = "RENDER";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loglevel: String,
    pub dependencies: DependencyConfig,
    pub uploads: UploadConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    pub manifest: PathBuf,
    pub installer: String,
    /// Arguments placed before the manifest path.
    pub installer_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub sqlite_path: PathBuf,
    pub require_url: bool,
    pub seed_defaults: bool,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            dependencies: DependencyConfig::default(),
            uploads: UploadConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("requirements.txt"),
            installer: "pip".to_string(),
            installer_args: vec!["install".to_string(), "-r".to_string()],
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/uploads"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            sqlite_path: PathBuf::from("voting_system.db"),
            require_url: false,
            seed_defaults: true,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

impl Config {
    /// Full provider stack as read from the working directory and environment.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("BOOTSTRAP_").split("__"))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "database.url".into()),
            )
    }

    /// Load from the working directory and environment, then validate.
    pub fn load() -> Result<Self, BootstrapError> {
        let mut cfg = Self::from_figment(Self::figment())?;
        if std::env::var_os(HOSTED_MARKER).is_some() {
            cfg.database.require_url = true;
        }
        Ok(cfg)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, BootstrapError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), BootstrapError> {
        validate_path("dependencies.manifest", &self.dependencies.manifest)?;
        validate_non_empty("dependencies.installer", &self.dependencies.installer)?;
        validate_path("uploads.dir", &self.uploads.dir)?;
        validate_non_empty("database.admin_username", &self.database.admin_username)?;
        if self.database.url.is_none() {
            validate_path("database.sqlite_path", &self.database.sqlite_path)?;
        }
        if let Some(url) = &self.database.url {
            validate_non_empty("database.url", url)?;
        }
        Ok(())
    }
}

fn validate_non_empty(field: &'static str, value: &str) -> Result<(), BootstrapError> {
    if value.trim().is_empty() {
        return Err(BootstrapError::InvalidConfig {
            field,
            reason: "value cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_path(field: &'static str, path: &Path) -> Result<(), BootstrapError> {
    let raw = path.as_os_str();
    if raw.is_empty() {
        return Err(BootstrapError::InvalidConfig {
            field,
            reason: "path cannot be empty".to_string(),
        });
    }
    if raw.to_string_lossy().contains('\0') {
        return Err(BootstrapError::InvalidConfig {
            field,
            reason: "path contains null bytes".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_toml(toml: &str) -> Result<Config, BootstrapError> {
        Config::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::string(toml)),
        )
    }

    #[test]
    fn defaults_match_conventional_layout() {
        let cfg = with_toml("").unwrap();
        assert_eq!(cfg.dependencies.manifest, PathBuf::from("requirements.txt"));
        assert_eq!(cfg.dependencies.installer, "pip");
        assert_eq!(cfg.dependencies.installer_args, vec!["install", "-r"]);
        assert_eq!(cfg.uploads.dir, PathBuf::from("static/uploads"));
        assert!(cfg.database.url.is_none());
        assert!(cfg.database.seed_defaults);
    }

    #[test]
    fn toml_overrides_nested_sections() {
        let cfg = with_toml(
            r#"
            loglevel = "debug"
            [uploads]
            dir = "media/files"
            [database]
            url = "sqlite:other.db"
            seed_defaults = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.loglevel, "debug");
        assert_eq!(cfg.uploads.dir, PathBuf::from("media/files"));
        assert_eq!(cfg.database.url.as_deref(), Some("sqlite:other.db"));
        assert!(!cfg.database.seed_defaults);
        // untouched keys keep their defaults
        assert_eq!(cfg.database.admin_username, "admin");
    }

    #[test]
    fn empty_installer_is_rejected() {
        let err = with_toml(
            r#"
            [dependencies]
            installer = "  "
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::InvalidConfig {
                field: "dependencies.installer",
                ..
            }
        ));
    }

    #[test]
    fn empty_upload_dir_is_rejected() {
        let err = with_toml(
            r#"
            [uploads]
            dir = ""
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::InvalidConfig {
                field: "uploads.dir",
                ..
            }
        ));
    }
}
