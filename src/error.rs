use sqlx::Error as SqlxError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Exit status used when the process is interrupted mid-bootstrap.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

#[derive(Debug, ThisError)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Invalid configuration value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Dependency manifest not found: {}", .path.display())]
    ManifestMissing { path: PathBuf },

    #[error("Failed to read dependency manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed manifest entry on line {line} ({entry:?}): {reason}")]
    ManifestMalformed {
        line: usize,
        entry: String,
        reason: &'static str,
    },

    #[error("Failed to launch installer `{program}`: {source}")]
    InstallerLaunch {
        program: String,
        source: std::io::Error,
    },

    #[error("Installer `{program}` exited with {}", describe_code(.code))]
    InstallerFailed { program: String, code: Option<i32> },

    #[error("Path exists and is not a directory: {}", .path.display())]
    PathCollision { path: PathBuf },

    #[error("Failed to inspect {}: {source}", .path.display())]
    DirInspect {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Directory is not writable: {}: {source}", .path.display())]
    NotWritable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Unsupported database scheme `{scheme}`")]
    UnsupportedStore { scheme: String },

    #[error("DATABASE_URL must be set for hosted deployments")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Table `{table}` exists but is missing columns: {}", .missing.join(", "))]
    IncompatibleSchema { table: String, missing: Vec<String> },

    #[error("Schema still incomplete after initialization")]
    SchemaNotReady,
}

impl BootstrapError {
    /// Process exit status for this failure.
    ///
    /// A failed installer hands its own exit code through; everything else is 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            BootstrapError::InstallerFailed {
                code: Some(code), ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
