//! Reporting and artifact export.

pub mod artifacts;
pub mod markdown;

pub use artifacts::{write_annotated, ArtifactManager, ArtifactPaths, RunManifest, StatsPaths};
pub use markdown::render_report;
