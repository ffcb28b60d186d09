//! Configuration module for Blog-Audit
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and reading the analysis API credential from the environment.
//!
//! # Example
//!
//! ```no_run
//! use blog_audit::config::{load_config, ApiCredentials};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! let credentials = ApiCredentials::from_env(&config.analysis).unwrap();
//! ```

mod credentials;
mod parser;
mod types;
mod validation;

pub use credentials::ApiCredentials;
pub use types::{
    AnalysisConfig, Config, FetcherConfig, OutputConfig, OutputFormat, PipelineConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
