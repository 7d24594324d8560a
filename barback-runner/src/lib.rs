//! Barback Runner — batch orchestration, configuration, and reporting.
//!
//! Sits on top of `barback-core`: resolves a [`BatchConfig`] into one
//! engine run per [`RunSpec`] (optionally in parallel), collects
//! outcomes and skips in configured order, and exports summary CSVs and
//! per-run artifact directories.

pub mod config;
pub mod report;
pub mod runner;

pub use config::{BatchConfig, ConfigError, RunId, RunSpec};
pub use report::{
    load_manifest, render_summary_table, save_artifacts, write_summary_csv, ArtifactPaths,
    RunManifest,
};
pub use runner::{
    run_batch, run_single, BatchResult, RunError, RunOutcome, SkipRecord, SymbolRecord,
    SCHEMA_VERSION,
};
