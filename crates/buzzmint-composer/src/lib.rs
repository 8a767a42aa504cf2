//! Meme composition: turns live-signal context into promotional PNG images.
//!
//! The input is a validated [`MemeSpec`] describing the business being
//! promoted, the detected moment, crowd mood, keywords, and candidate
//! photos. [`Composer::compose`] fetches what photos it can, renders one of
//! three styles (classic, grid, card), and encodes a PNG. Rendering is fully
//! deterministic unless the spec opts into randomization, and even then a
//! seed reproduces the exact composition.

mod background;
mod copy;
mod draw;
pub mod error;
mod layout;
mod render;
pub mod spec;
mod text;

pub use copy::build_caption;
pub use error::ComposeError;
pub use render::Composer;
pub use spec::{
    MemeImage, MemeSpec, MemeSpecBuilder, MemeStyle, MomentTag, MAX_DIMENSION, MIN_DIMENSION,
};
