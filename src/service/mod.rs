//! Collaborators driven by the bootstrap steps.

pub mod installer;
pub mod manifest;
pub mod uploads;

pub use installer::CommandInstaller;
pub use manifest::{Manifest, Package, Requirement, Source};
pub use uploads::{DirOutcome, ensure_dir};
