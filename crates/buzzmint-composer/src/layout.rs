//! Layout variants and the randomness seam.
//!
//! Every compositional choice, which variant, gallery order, copy lines,
//! flows through a [`Chooser`]. A non-randomized spec gets the `Fixed`
//! chooser and always produces variant 0 with untouched ordering, so the
//! same spec yields byte-identical PNGs. A randomized spec gets a seeded
//! RNG; supplying the seed reproduces the exact composition.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::spec::MemeSpec;

pub(crate) enum Chooser {
    Fixed,
    Seeded(StdRng),
}

impl Chooser {
    pub(crate) fn for_spec(spec: &MemeSpec) -> Self {
        if !spec.randomize() {
            return Chooser::Fixed;
        }
        let seed = match spec.seed() {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<u64>();
                debug!(seed, "no seed supplied, drew one");
                seed
            }
        };
        Chooser::Seeded(StdRng::seed_from_u64(seed))
    }

    /// Index into a slice of `len` options. `Fixed` always picks the first.
    pub(crate) fn pick(&mut self, len: usize) -> usize {
        match self {
            Chooser::Fixed => 0,
            Chooser::Seeded(rng) => rng.random_range(0..len.max(1)),
        }
    }

    /// Bernoulli draw. `Fixed` never fires.
    pub(crate) fn chance(&mut self, probability: f64) -> bool {
        match self {
            Chooser::Fixed => false,
            Chooser::Seeded(rng) => rng.random_bool(probability.clamp(0.0, 1.0)),
        }
    }

    /// Shuffle in place. `Fixed` preserves order.
    pub(crate) fn shuffle<T>(&mut self, items: &mut [T]) {
        if let Chooser::Seeded(rng) = self {
            items.shuffle(rng);
        }
    }
}

/// One classic-style arrangement: band sizes, headline sizing, and whether
/// the photo area splits into two panels.
pub(crate) struct ClassicVariant {
    /// Fraction of canvas height given to the top text band.
    pub top_frac: f32,
    /// Fraction of canvas height given to the bottom text band.
    pub bottom_frac: f32,
    /// Headline glyph scale on a 1024-wide canvas; scaled with width.
    pub headline_scale: u32,
    /// Solid call-to-action band along the bottom edge.
    pub cta_band: bool,
    /// Split the photo area into two side-by-side panels.
    pub split_photos: bool,
}

pub(crate) const CLASSIC_VARIANTS: [ClassicVariant; 4] = [
    ClassicVariant {
        top_frac: 0.22,
        bottom_frac: 0.26,
        headline_scale: 7,
        cta_band: true,
        split_photos: false,
    },
    ClassicVariant {
        top_frac: 0.18,
        bottom_frac: 0.22,
        headline_scale: 8,
        cta_band: false,
        split_photos: false,
    },
    ClassicVariant {
        top_frac: 0.24,
        bottom_frac: 0.28,
        headline_scale: 6,
        cta_band: true,
        split_photos: true,
    },
    ClassicVariant {
        top_frac: 0.20,
        bottom_frac: 0.24,
        headline_scale: 7,
        cta_band: false,
        split_photos: true,
    },
];

/// One grid-style arrangement.
pub(crate) struct GridVariant {
    /// Opacity of the mood banner blended across the top.
    pub banner_alpha: f32,
    /// Tile keyword labels sit at the tile top instead of the bottom.
    pub labels_at_top: bool,
    /// Pixel gap between tiles on a 1024-wide canvas; scaled with width.
    pub gutter: u32,
}

pub(crate) const GRID_VARIANTS: [GridVariant; 3] = [
    GridVariant {
        banner_alpha: 0.55,
        labels_at_top: false,
        gutter: 8,
    },
    GridVariant {
        banner_alpha: 0.70,
        labels_at_top: true,
        gutter: 12,
    },
    GridVariant {
        banner_alpha: 0.45,
        labels_at_top: false,
        gutter: 4,
    },
];

/// One card-style arrangement.
pub(crate) struct CardVariant {
    /// Fraction of canvas height given to the offer banner.
    pub banner_frac: f32,
    /// Accent bar down the left edge.
    pub accent: bool,
    /// Fraction of canvas width the text column occupies.
    pub text_frac: f32,
}

pub(crate) const CARD_VARIANTS: [CardVariant; 3] = [
    CardVariant {
        banner_frac: 0.16,
        accent: true,
        text_frac: 0.80,
    },
    CardVariant {
        banner_frac: 0.20,
        accent: false,
        text_frac: 0.88,
    },
    CardVariant {
        banner_frac: 0.14,
        accent: true,
        text_frac: 0.72,
    },
];

/// Tile rectangles `(x, y, w, h)` for a grid of 1, 2, or 4 tiles with the
/// given gutter, spanning `width` by `height`.
pub(crate) fn tile_rects(tiles: u8, width: u32, height: u32, gutter: u32) -> Vec<(i64, i64, u32, u32)> {
    let g = gutter.min(width / 8).min(height / 8);
    match tiles {
        1 => vec![(0, 0, width, height)],
        2 => {
            let w = (width - g) / 2;
            vec![
                (0, 0, w, height),
                (i64::from(w + g), 0, width - w - g, height),
            ]
        }
        _ => {
            let w = (width - g) / 2;
            let h = (height - g) / 2;
            let right_x = i64::from(w + g);
            let lower_y = i64::from(h + g);
            let right_w = width - w - g;
            let lower_h = height - h - g;
            vec![
                (0, 0, w, h),
                (right_x, 0, right_w, h),
                (0, lower_y, w, lower_h),
                (right_x, lower_y, right_w, lower_h),
            ]
        }
    }
}
