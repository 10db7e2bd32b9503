//! Shared types, error model, and configuration for docreview.
//!
//! This crate is the foundation depended on by all other docreview crates.
//! It provides:
//! - [`DocReviewError`] — the unified error type
//! - Domain types ([`RunRecord`], [`RunEvent`], [`RunId`], [`Mode`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OracleConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_api_key,
};
pub use error::{DocReviewError, Result};
pub use types::{EventKind, Mode, RunEvent, RunId, RunPhase, RunRecord, RunStatus};
