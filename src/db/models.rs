use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Constituency {
    pub name: String,
    pub state: String,
}

/// Whether the store already carries every structure the application needs.
///
/// `Uninitialized -> Ready` is one-way; initializing a `Ready` store keeps it `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Uninitialized,
    Ready,
}

impl fmt::Display for SchemaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaState::Uninitialized => f.write_str("uninitialized"),
            SchemaState::Ready => f.write_str("ready"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub previous: SchemaState,
    pub constituencies_added: u64,
    pub admin_created: bool,
}
