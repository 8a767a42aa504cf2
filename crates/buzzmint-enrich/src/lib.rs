//! Person verification and profile enrichment against Wikipedia/Wikidata.
//!
//! The feed's name extractor over-detects on purpose; this crate is the
//! filter. A candidate only becomes an [`buzzmint_core::EntityProfile`] when
//! Wikipedia resolves it to a page whose subject checks out as a human, via
//! the Wikidata instance-of claim or, failing that, an occupation hint in the
//! page description.

pub mod client;
pub mod error;
mod verify;

pub use client::EnrichClient;
pub use error::EnrichError;
