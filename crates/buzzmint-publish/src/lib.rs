//! Best-effort publishing of composed memes to X.

pub mod client;
pub mod error;

pub use client::{PublishClient, PublishOutcome, TOKEN_ENV_VAR};
pub use error::PublishError;
