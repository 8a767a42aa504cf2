//! The immutable input to one compose call.
//!
//! A [`MemeSpec`] is built once through [`MemeSpecBuilder`], validated at
//! `build()`, and never mutated afterwards; rendering the same spec twice
//! yields byte-identical PNGs (randomized specs need the same seed).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use buzzmint_core::{EntityProfile, Moment, Vibe};
use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// Smallest canvas the text layout can work with.
pub const MIN_DIMENSION: u32 = 64;
/// Largest canvas accepted; beyond this, encode cost stops being interactive.
pub const MAX_DIMENSION: u32 = 4096;

const DEFAULT_WIDTH: u32 = 1024;
const DEFAULT_HEIGHT: u32 = 1024;
const DEFAULT_TILES: u8 = 4;

/// Visual arrangement of the meme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemeStyle {
    /// One background photo with top/bottom impact text.
    Classic,
    /// 1, 2, or 4 photo tiles under a headline band.
    Grid { tiles: u8 },
    /// Ad-card layout: headline, punchline, and an offer banner.
    Card,
}

impl MemeStyle {
    /// Parse a style from its query-string tag. `tiles` only applies to
    /// `grid` and is validated here so callers get the error before any
    /// rendering work starts.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidSpec`] for an unknown tag or a grid
    /// tile count other than 1, 2, or 4.
    pub fn from_tag(tag: &str, tiles: u8) -> Result<Self, ComposeError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "card" => Ok(Self::Card),
            "grid" => {
                if matches!(tiles, 1 | 2 | 4) {
                    Ok(Self::Grid { tiles })
                } else {
                    Err(ComposeError::InvalidSpec(format!(
                        "grid tiles must be 1, 2, or 4 (got {tiles})"
                    )))
                }
            }
            other => Err(ComposeError::InvalidSpec(format!(
                "unknown style '{other}' (expected classic, grid, or card)"
            ))),
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Grid { .. } => "grid",
            Self::Card => "card",
        }
    }
}

impl Default for MemeStyle {
    fn default() -> Self {
        Self::Grid {
            tiles: DEFAULT_TILES,
        }
    }
}

/// The detected moment, reduced to what the copywriter needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentTag {
    pub label: String,
    pub sentiment: f32,
}

impl From<&Moment> for MomentTag {
    fn from(moment: &Moment) -> Self {
        Self {
            label: moment.label.clone(),
            sentiment: moment.aggregate_sentiment,
        }
    }
}

/// Full description of one meme to render.
#[derive(Debug, Clone)]
pub struct MemeSpec {
    business_name: String,
    offer_text: String,
    moment: Option<MomentTag>,
    entity_profile: Option<EntityProfile>,
    vibe: Vibe,
    keywords: Vec<String>,
    style: MemeStyle,
    background_url: Option<String>,
    gallery: Vec<String>,
    with_portrait: bool,
    randomize: bool,
    seed: Option<u64>,
    width: u32,
    height: u32,
}

impl MemeSpec {
    /// Start a builder; business name and offer text are the only required
    /// fields.
    pub fn builder(
        business_name: impl Into<String>,
        offer_text: impl Into<String>,
    ) -> MemeSpecBuilder {
        MemeSpecBuilder {
            business_name: business_name.into(),
            offer_text: offer_text.into(),
            moment: None,
            entity_profile: None,
            vibe: Vibe::Neutral,
            keywords: Vec::new(),
            style: MemeStyle::default(),
            background_url: None,
            gallery: Vec::new(),
            with_portrait: true,
            randomize: false,
            seed: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    #[must_use]
    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    #[must_use]
    pub fn offer_text(&self) -> &str {
        &self.offer_text
    }

    #[must_use]
    pub fn moment(&self) -> Option<&MomentTag> {
        self.moment.as_ref()
    }

    #[must_use]
    pub fn entity_profile(&self) -> Option<&EntityProfile> {
        self.entity_profile.as_ref()
    }

    #[must_use]
    pub fn vibe(&self) -> Vibe {
        self.vibe
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    #[must_use]
    pub fn style(&self) -> MemeStyle {
        self.style
    }

    #[must_use]
    pub fn background_url(&self) -> Option<&str> {
        self.background_url.as_deref()
    }

    #[must_use]
    pub fn gallery(&self) -> &[String] {
        &self.gallery
    }

    #[must_use]
    pub fn with_portrait(&self) -> bool {
        self.with_portrait
    }

    #[must_use]
    pub fn randomize(&self) -> bool {
        self.randomize
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Builder for [`MemeSpec`]. Optional fields take `Option` so call sites can
/// forward query parameters without branching.
#[derive(Debug, Clone)]
pub struct MemeSpecBuilder {
    business_name: String,
    offer_text: String,
    moment: Option<MomentTag>,
    entity_profile: Option<EntityProfile>,
    vibe: Vibe,
    keywords: Vec<String>,
    style: MemeStyle,
    background_url: Option<String>,
    gallery: Vec<String>,
    with_portrait: bool,
    randomize: bool,
    seed: Option<u64>,
    width: u32,
    height: u32,
}

impl MemeSpecBuilder {
    #[must_use]
    pub fn moment(mut self, moment: Option<MomentTag>) -> Self {
        self.moment = moment;
        self
    }

    #[must_use]
    pub fn entity_profile(mut self, profile: Option<EntityProfile>) -> Self {
        self.entity_profile = profile;
        self
    }

    #[must_use]
    pub fn vibe(mut self, vibe: Vibe) -> Self {
        self.vibe = vibe;
        self
    }

    #[must_use]
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    #[must_use]
    pub fn style(mut self, style: MemeStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn background_url(mut self, url: Option<String>) -> Self {
        self.background_url = url;
        self
    }

    /// Additional candidate photos, best first (typically pulled from the
    /// trending posts themselves).
    #[must_use]
    pub fn gallery(mut self, urls: Vec<String>) -> Self {
        self.gallery = urls;
        self
    }

    /// Whether the entity's portrait may be used as a photo source.
    #[must_use]
    pub fn with_portrait(mut self, yes: bool) -> Self {
        self.with_portrait = yes;
        self
    }

    /// Vary layout and copy between calls. Without a seed, each compose draws
    /// fresh entropy; with one, the variation is reproducible.
    #[must_use]
    pub fn randomize(mut self, yes: bool) -> Self {
        self.randomize = yes;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Validate and freeze the spec.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidSpec`] when the business name or offer
    /// text is blank, a dimension falls outside
    /// [`MIN_DIMENSION`]`..=`[`MAX_DIMENSION`], or a grid style carries a
    /// tile count other than 1, 2, or 4.
    pub fn build(self) -> Result<MemeSpec, ComposeError> {
        let business_name = self.business_name.trim().to_string();
        if business_name.is_empty() {
            return Err(ComposeError::InvalidSpec(
                "business name must not be empty".to_string(),
            ));
        }

        let offer_text = self.offer_text.trim().to_string();
        if offer_text.is_empty() {
            return Err(ComposeError::InvalidSpec(
                "offer text must not be empty".to_string(),
            ));
        }

        for dim in [self.width, self.height] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&dim) {
                return Err(ComposeError::InvalidSpec(format!(
                    "dimensions must be within {MIN_DIMENSION}..={MAX_DIMENSION} pixels \
                     (got {}x{})",
                    self.width, self.height
                )));
            }
        }

        if let MemeStyle::Grid { tiles } = self.style {
            if !matches!(tiles, 1 | 2 | 4) {
                return Err(ComposeError::InvalidSpec(format!(
                    "grid tiles must be 1, 2, or 4 (got {tiles})"
                )));
            }
        }

        Ok(MemeSpec {
            business_name,
            offer_text,
            moment: self.moment,
            entity_profile: self.entity_profile,
            vibe: self.vibe,
            keywords: self.keywords,
            style: self.style,
            background_url: self.background_url,
            gallery: self.gallery,
            with_portrait: self.with_portrait,
            randomize: self.randomize,
            seed: self.seed,
            width: self.width,
            height: self.height,
        })
    }
}

/// A finished render.
#[derive(Debug, Clone)]
pub struct MemeImage {
    /// Encoded PNG.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub media_type: &'static str,
    /// Index of the layout variant the composer chose, for debugging and
    /// reproducibility checks.
    pub variant: usize,
}

impl MemeImage {
    /// `data:` URL embedding of the PNG, for JSON responses.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            STANDARD.encode(&self.bytes)
        )
    }
}
