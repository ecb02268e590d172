use crate::config::DatabaseConfig;
use crate::db::schema::{Dialect, POSTGRES, SQLITE};
use crate::error::BootstrapError;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Postgres,
}

impl StoreKind {
    pub fn dialect(self) -> &'static Dialect {
        match self {
            StoreKind::Sqlite => &SQLITE,
            StoreKind::Postgres => &POSTGRES,
        }
    }
}

/// The store the schema initializer works against, resolved once from configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreTarget {
    kind: StoreKind,
    url: String,
}

impl StoreTarget {
    pub fn resolve(cfg: &DatabaseConfig) -> Result<Self, BootstrapError> {
        match cfg.url.as_deref() {
            Some(url) => Self::from_url(url),
            None if cfg.require_url => Err(BootstrapError::MissingDatabaseUrl),
            None => Ok(Self {
                kind: StoreKind::Sqlite,
                url: format!("sqlite://{}?mode=rwc", cfg.sqlite_path.display()),
            }),
        }
    }

    pub fn from_url(raw: &str) -> Result<Self, BootstrapError> {
        let raw = raw.trim();
        // Hosting platforms still hand out the legacy scheme.
        let normalized = match raw.strip_prefix("postgres://") {
            Some(rest) => format!("postgresql://{rest}"),
            None => raw.to_string(),
        };

        let mut parsed = Url::parse(&normalized)?;
        let scheme = parsed.scheme().to_string();
        match scheme.as_str() {
            "postgresql" => Ok(Self {
                kind: StoreKind::Postgres,
                url: normalized,
            }),
            "sqlite" => {
                let in_memory = normalized.contains(":memory:");
                let has_mode = parsed.query_pairs().any(|(k, _)| k == "mode");
                let url = if in_memory || has_mode {
                    normalized
                } else {
                    parsed.query_pairs_mut().append_pair("mode", "rwc");
                    parsed.to_string()
                };
                Ok(Self {
                    kind: StoreKind::Sqlite,
                    url,
                })
            }
            other => Err(BootstrapError::UnsupportedStore {
                scheme: other.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Redacted: never shows credentials.
impl fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StoreKind::Sqlite => f.write_str(&self.url),
            StoreKind::Postgres => match Url::parse(&self.url) {
                Ok(u) => write!(
                    f,
                    "postgresql://{}{}",
                    u.host_str().unwrap_or("localhost"),
                    u.path()
                ),
                Err(_) => f.write_str("postgresql://<unparseable>"),
            },
        }
    }
}

impl fmt::Debug for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreTarget")
            .field("kind", &self.kind)
            .field("url", &self.to_string())
            .finish()
    }
}
