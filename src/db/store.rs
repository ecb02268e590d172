use crate::config::DatabaseConfig;
use crate::db::models::{Constituency, InitOutcome, SchemaState};
use crate::db::schema::{CONSTITUENCIES, CONSTITUENCY_STATE, Dialect, REQUIRED_TABLES, TableSpec};
use crate::db::target::StoreTarget;
use crate::error::BootstrapError;
use sha2::{Digest, Sha256};
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{Any, Pool, Transaction};
use tracing::{debug, info, warn};

pub type AnyPool = Pool<Any>;

/// Default rows written on initialization.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub admin_username: String,
    pub admin_password: String,
}

impl SeedPlan {
    pub fn from_config(cfg: &DatabaseConfig) -> Option<Self> {
        cfg.seed_defaults.then(|| Self {
            admin_username: cfg.admin_username.clone(),
            admin_password: cfg.admin_password.clone(),
        })
    }
}

/// Lowercase hex SHA-256, the password format the application checks against.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[derive(Clone)]
pub struct SchemaStore {
    pool: AnyPool,
    dialect: &'static Dialect,
}

impl SchemaStore {
    pub async fn connect(target: &StoreTarget) -> Result<Self, BootstrapError> {
        install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(target.url())
            .await?;
        debug!(store = %target, "connected to store");
        Ok(Self {
            pool,
            dialect: target.kind().dialect(),
        })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Inspect the store without modifying it.
    ///
    /// An existing table that lacks a required column is an error, not a state.
    pub async fn state(&self) -> Result<SchemaState, BootstrapError> {
        let mut missing_tables = 0usize;
        for table in REQUIRED_TABLES {
            if !self.table_exists(table.name).await? {
                missing_tables += 1;
                continue;
            }
            self.check_columns(table).await?;
        }
        Ok(if missing_tables == 0 {
            SchemaState::Ready
        } else {
            SchemaState::Uninitialized
        })
    }

    /// Bring the store to `Ready`. Safe to repeat: existing rows are never touched.
    pub async fn initialize(&self, seed: Option<&SeedPlan>) -> Result<InitOutcome, BootstrapError> {
        let previous = self.state().await?;

        let mut tx = self.pool.begin().await?;
        // sqlx::query runs one statement at a time
        for stmt in self.dialect.init.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut *tx).await?;
        }

        let mut outcome = InitOutcome {
            previous,
            constituencies_added: 0,
            admin_created: false,
        };
        if let Some(plan) = seed {
            outcome.constituencies_added = self.seed_constituencies(&mut tx).await?;
            outcome.admin_created = self.seed_admin(&mut tx, plan).await?;
        }
        tx.commit().await?;

        if self.state().await? != SchemaState::Ready {
            return Err(BootstrapError::SchemaNotReady);
        }
        Ok(outcome)
    }

    pub async fn constituencies(&self) -> Result<Vec<Constituency>, BootstrapError> {
        let rows = sqlx::query_as::<_, Constituency>(self.dialect.list_constituencies)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn table_exists(&self, table: &str) -> Result<bool, BootstrapError> {
        let count: i64 = sqlx::query_scalar(self.dialect.table_exists)
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn check_columns(&self, table: &TableSpec) -> Result<(), BootstrapError> {
        let present: Vec<String> = sqlx::query_scalar(self.dialect.table_columns)
            .bind(table.name)
            .fetch_all(&self.pool)
            .await?;
        let missing: Vec<String> = table
            .columns
            .iter()
            .filter(|col| !present.iter().any(|p| p.eq_ignore_ascii_case(col)))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BootstrapError::IncompatibleSchema {
                table: table.name.to_string(),
                missing,
            });
        }
        Ok(())
    }

    async fn seed_constituencies(
        &self,
        tx: &mut Transaction<'static, Any>,
    ) -> Result<u64, BootstrapError> {
        let mut added = 0;
        for name in CONSTITUENCIES {
            let res = sqlx::query(self.dialect.insert_constituency)
                .bind(*name)
                .bind(CONSTITUENCY_STATE)
                .execute(&mut **tx)
                .await?;
            added += res.rows_affected();
        }
        if added > 0 {
            info!(added, state = CONSTITUENCY_STATE, "seeded constituencies");
        }
        Ok(added)
    }

    async fn seed_admin(
        &self,
        tx: &mut Transaction<'static, Any>,
        plan: &SeedPlan,
    ) -> Result<bool, BootstrapError> {
        let existing: i64 = sqlx::query_scalar(self.dialect.count_admins_named)
            .bind(plan.admin_username.as_str())
            .fetch_one(&mut **tx)
            .await?;
        if existing > 0 {
            return Ok(false);
        }

        sqlx::query(self.dialect.insert_admin)
            .bind(plan.admin_username.as_str())
            .bind(hash_password(&plan.admin_password))
            .execute(&mut **tx)
            .await?;
        warn!(
            username = %plan.admin_username,
            "default admin account created; change its password"
        );
        Ok(true)
    }
}
