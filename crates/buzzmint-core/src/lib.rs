//! Shared domain types and configuration for buzzmint.
//!
//! Holds the data model passed between the feed, signal, enrichment, and
//! composer crates (posts, sentiment scores, moments, entity profiles), the
//! process-wide `AppConfig` loaded from environment variables, and the
//! moment keyword table / entity stoplist loaded from YAML.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod moments;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use moments::{
    load_moments, load_moments_if_present, MomentRule, MomentTable, MomentsFile, Stoplist,
};
pub use types::{EntityProfile, Moment, Post, SentimentScore, Vibe};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read moments file at {path}: {source}")]
    MomentsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse moments file: {0}")]
    MomentsFileParse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
