//! Shared types, error model, and configuration for Prospector.
//!
//! This crate is the foundation depended on by all other Prospector crates.
//! It provides:
//! - [`ProspectorError`], the unified error type
//! - Domain types ([`CompanyRecord`], [`ContactRecord`], [`Signals`], [`Prospect`], [`SearchRunId`])
//! - The ICP document ([`IcpSpec`]) and its loaders
//! - Configuration ([`AppConfig`], config loading, API key lookup)

pub mod config;
pub mod error;
pub mod icp;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BucketsConfig, DedupeConfig, OutputConfig, SourcesConfig, api_key_from_env,
    config_dir, config_file_path, init_config, load_config, load_config_from, render_config,
    validate_api_keys,
};
pub use error::{ProspectorError, Result};
pub use icp::{IcpCriteria, IcpSpec, SearchParams, SignalPreferences};
pub use types::{
    CompanyRecord, ContactRecord, FundingRound, HiringSignals, Prospect, RawRecord, SearchRunId,
    Signals, SourceKind,
};
