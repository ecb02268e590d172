//! Database module: target resolution, schema and the initializer.
//!
//! Layout:
//! - `target.rs`: which store to initialize, resolved from configuration
//! - `schema.rs`: SQL DDL and queries per backend (SQLite, PostgreSQL)
//! - `models.rs`: schema state and row structs
//! - `store.rs`: connection, inspection, idempotent initialization and seeding

pub mod models;
pub mod schema;
pub mod store;
pub mod target;

pub use models::{Constituency, InitOutcome, SchemaState};
pub use store::{AnyPool, SchemaStore, SeedPlan, hash_password};
pub use target::{StoreKind, StoreTarget};
