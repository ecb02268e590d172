pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod service;

pub use bootstrap::{Bootstrap, BootstrapReport, Step};
pub use config::Config;
pub use error::BootstrapError;

/// Run the standard bootstrap for an already-loaded configuration.
pub async fn run(cfg: &Config) -> Result<BootstrapReport, BootstrapError> {
    Bootstrap::from_config(cfg)?.run().await
}
