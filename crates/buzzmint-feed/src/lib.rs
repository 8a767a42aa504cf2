//! Live post feed for buzzmint.
//!
//! Pulls fresh posts from Reddit's public JSON search endpoint, converts them
//! into [`buzzmint_core::Post`] values, and digs image URLs out of the many
//! payload shapes Reddit uses (galleries, crossposts, previews, direct links).
//! Transient upstream failures are retried with exponential back-off; callers
//! treat a failed fetch as an empty batch, never a hard stop.

pub mod client;
pub mod error;

mod extract;
mod retry;

pub use client::{FeedClient, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
pub use error::FeedError;
