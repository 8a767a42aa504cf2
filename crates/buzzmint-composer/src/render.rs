//! The composer itself: photo gathering, style renderers, PNG encoding.
//!
//! Each style renderer is a pure function from spec + fetched photos to an
//! `RgbImage`, so layout logic is testable without any network. The business
//! name and offer text are drawn in every style and variant; a promo that
//! can drop its promotion is useless.

use std::collections::HashSet;
use std::io::Cursor;
use std::time::Duration;

use image::{imageops, DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::debug;

use crate::background;
use crate::copy;
use crate::draw;
use crate::error::ComposeError;
use crate::layout::{
    self, CardVariant, Chooser, ClassicVariant, GridVariant, CARD_VARIANTS, CLASSIC_VARIANTS,
    GRID_VARIANTS,
};
use crate::spec::{MemeImage, MemeSpec, MemeStyle};
use crate::text;

pub(crate) const CTA_YELLOW: Rgb<u8> = Rgb([255, 213, 79]);

const GRID_FILLERS: [Rgb<u8>; 2] = [Rgb([24, 32, 56]), Rgb([18, 24, 44])];

/// Renders meme specs to PNG bytes.
///
/// Cheap to clone; the inner HTTP client is reference counted.
#[derive(Debug, Clone)]
pub struct Composer {
    client: reqwest::Client,
}

impl Composer {
    /// Build a composer whose photo fetches use the given timeout and
    /// user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Http`] when the HTTP client cannot be
    /// constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ComposeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Render one meme.
    ///
    /// Photo fetches that fail are skipped, never fatal; with no usable
    /// photos the style gradient carries the composition.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Encode`] when PNG encoding fails.
    pub async fn compose(&self, spec: &MemeSpec) -> Result<MemeImage, ComposeError> {
        let mut chooser = Chooser::for_spec(spec);

        // Choice order is fixed: variant, then gallery order, then copy.
        // Reordering these would silently change what a seed reproduces.
        let variant = match spec.style() {
            MemeStyle::Classic => chooser.pick(CLASSIC_VARIANTS.len()),
            MemeStyle::Grid { .. } => chooser.pick(GRID_VARIANTS.len()),
            MemeStyle::Card => chooser.pick(CARD_VARIANTS.len()),
        };

        let pool = photo_pool(spec, &mut chooser);
        let want = match spec.style() {
            MemeStyle::Grid { tiles } => usize::from(tiles),
            MemeStyle::Classic => {
                if CLASSIC_VARIANTS[variant].split_photos {
                    2
                } else {
                    1
                }
            }
            MemeStyle::Card => 1,
        };
        let photos = self.gather_photos(&pool, want).await;
        debug!(
            style = spec.style().tag(),
            variant,
            candidates = pool.len(),
            fetched = photos.len(),
            "composing meme"
        );

        let canvas = match spec.style() {
            MemeStyle::Classic => {
                render_classic(spec, &CLASSIC_VARIANTS[variant], &photos, &mut chooser)
            }
            MemeStyle::Grid { tiles } => {
                render_grid(spec, tiles, &GRID_VARIANTS[variant], &photos)
            }
            MemeStyle::Card => render_card(spec, &CARD_VARIANTS[variant], photos.first()),
        };

        let (bytes, width, height) = encode_png(canvas)?;
        Ok(MemeImage {
            bytes,
            width,
            height,
            media_type: "image/png",
            variant,
        })
    }

    /// Fetch candidates in pool order until `want` photos decoded.
    async fn gather_photos(&self, pool: &[String], want: usize) -> Vec<DynamicImage> {
        let mut photos = Vec::new();
        for url in pool {
            if photos.len() >= want {
                break;
            }
            if let Some(photo) = background::fetch_image(&self.client, url).await {
                photos.push(photo);
            }
        }
        photos
    }
}

/// Candidate photo URLs, best first: explicit background, entity portrait,
/// then the gallery (shuffled when randomizing). Duplicates are dropped
/// keeping the first occurrence.
fn photo_pool(spec: &MemeSpec, chooser: &mut Chooser) -> Vec<String> {
    let mut pool: Vec<String> = Vec::new();
    if let Some(url) = spec.background_url() {
        pool.push(url.to_string());
    }
    if spec.with_portrait() {
        if let Some(thumbnail) = spec.entity_profile().and_then(|p| p.thumbnail_url.as_deref()) {
            pool.push(thumbnail.to_string());
        }
    }
    let mut gallery = spec.gallery().to_vec();
    chooser.shuffle(&mut gallery);
    pool.extend(gallery);

    let mut seen = HashSet::new();
    pool.retain(|url| seen.insert(url.clone()));
    pool
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn frac(extent: u32, fraction: f32) -> u32 {
    (extent as f32 * fraction) as u32
}

/// Scale a 1024-reference size to the actual canvas width.
fn scaled(base: u32, width: u32) -> u32 {
    (base * width / 1024).max(1)
}

#[allow(clippy::cast_possible_truncation)]
fn block_height(lines: &[String], scale: u32) -> u32 {
    text::line_height(scale) * lines.len() as u32
}

fn promo_band_height(height: u32) -> u32 {
    (height / 10).max(text::line_height(2) + 4)
}

/// Bottom-edge promotion, as a solid call-to-action band or an outlined
/// footer line. Every style funnels through here so the promotion cannot be
/// lost to a variant.
fn draw_promo_footer(canvas: &mut RgbImage, spec: &MemeSpec, band: bool, base_scale: u32) {
    let width = canvas.width();
    let height = canvas.height();
    let promo_band = promo_band_height(height);
    let promo_y = height.saturating_sub(promo_band);
    let promo = format!(
        "{} \u{b7} {}",
        spec.business_name().to_uppercase(),
        spec.offer_text().to_uppercase()
    );
    let margin = width / 32;
    let (scale, lines) = text::fit_lines(
        &promo,
        width.saturating_sub(2 * margin),
        promo_band,
        base_scale.saturating_sub(2).max(2),
        1,
    );
    let y = i64::from(promo_y + promo_band.saturating_sub(block_height(&lines, scale)) / 2);
    if band {
        draw::fill_rect(canvas, 0, i64::from(promo_y), width, promo_band, CTA_YELLOW);
        text::draw_centered_block(canvas, &lines, y, scale, text::DARK_TEXT, CTA_YELLOW);
    } else {
        text::draw_centered_block(canvas, &lines, y, scale, text::LIGHT_TEXT, Rgb([0, 0, 0]));
    }
}

fn classic_background(
    spec: &MemeSpec,
    variant: &ClassicVariant,
    photos: &[DynamicImage],
) -> RgbImage {
    let (width, height) = (spec.width(), spec.height());
    if photos.is_empty() {
        return background::style_gradient(&MemeStyle::Classic, width, height);
    }
    if variant.split_photos && photos.len() >= 2 {
        let half = width / 2;
        let left = background::contain_on_blur(&photos[0], half, height);
        let right = background::contain_on_blur(&photos[1], width - half, height);
        let mut canvas = RgbImage::new(width, height);
        imageops::overlay(&mut canvas, &left, 0, 0);
        imageops::overlay(&mut canvas, &right, i64::from(half), 0);
        return canvas;
    }
    background::contain_on_blur(&photos[0], width, height)
}

fn render_classic(
    spec: &MemeSpec,
    variant: &ClassicVariant,
    photos: &[DynamicImage],
    chooser: &mut Chooser,
) -> RgbImage {
    let (width, height) = (spec.width(), spec.height());
    let mut canvas = classic_background(spec, variant, photos);

    let (top_line, bottom_line) = copy::pick_classic_copy(
        chooser,
        spec.vibe(),
        spec.keywords(),
        spec.moment(),
        spec.business_name(),
        spec.offer_text(),
    );

    let margin = width / 32;
    let budget = width.saturating_sub(2 * margin);
    let headline_scale = scaled(variant.headline_scale, width).max(2);

    let top_band = frac(height, variant.top_frac);
    let (top_scale, top_lines) = text::fit_lines(&top_line, budget, top_band, headline_scale, 1);
    let luminance = draw::region_luminance(&canvas, 0, 0, width, top_band);
    let (fill, stroke) = text::contrast_colors(luminance);
    let top_y = i64::from(top_band.saturating_sub(block_height(&top_lines, top_scale)) / 2);
    text::draw_centered_block(&mut canvas, &top_lines, top_y, top_scale, fill, stroke);

    let promo_band = promo_band_height(height);
    let bottom_band = frac(height, variant.bottom_frac);
    let bottom_top = height.saturating_sub(promo_band + bottom_band);
    let (bottom_scale, bottom_lines) =
        text::fit_lines(&bottom_line, budget, bottom_band, headline_scale, 1);
    let luminance = draw::region_luminance(&canvas, 0, i64::from(bottom_top), width, bottom_band);
    let (fill, stroke) = text::contrast_colors(luminance);
    let bottom_y = i64::from(
        bottom_top + bottom_band.saturating_sub(block_height(&bottom_lines, bottom_scale)) / 2,
    );
    text::draw_centered_block(&mut canvas, &bottom_lines, bottom_y, bottom_scale, fill, stroke);

    draw_promo_footer(&mut canvas, spec, variant.cta_band, headline_scale);
    canvas
}

fn render_grid(
    spec: &MemeSpec,
    tiles: u8,
    variant: &GridVariant,
    photos: &[DynamicImage],
) -> RgbImage {
    let (width, height) = (spec.width(), spec.height());
    let mut canvas = background::style_gradient(&spec.style(), width, height);
    let gutter = scaled(variant.gutter, width);
    let rects = layout::tile_rects(tiles, width, height, gutter);

    for (index, &(x, y, w, h)) in rects.iter().enumerate() {
        if let Some(photo) = photos.get(index) {
            let tile = background::cover(photo, w, h);
            imageops::overlay(&mut canvas, &tile, x, y);
        } else {
            draw::fill_rect(&mut canvas, x, y, w, h, GRID_FILLERS[index % GRID_FILLERS.len()]);
        }
    }

    if photos.is_empty() {
        let (scale, lines) = text::fit_lines(
            "NO LIVE IMAGES FOUND",
            width * 3 / 4,
            height / 4,
            scaled(3, width).max(2),
            1,
        );
        let y = i64::from(height / 2) - i64::from(block_height(&lines, scale) / 2);
        text::draw_centered_block(&mut canvas, &lines, y, scale, text::LIGHT_TEXT, Rgb([0, 0, 0]));
    }

    // Mood banner blended across the top, over the tiles.
    let band = (height / 8).max(text::line_height(2));
    draw::blend_rect(&mut canvas, 0, 0, width, band, Rgb([8, 10, 18]), variant.banner_alpha);
    let mut banner = spec.vibe().shout().to_string();
    let leads: Vec<String> = spec
        .keywords()
        .iter()
        .take(2)
        .map(|k| k.to_uppercase())
        .collect();
    if !leads.is_empty() {
        banner = format!("{banner} \u{b7} {}", leads.join(" \u{b7} "));
    }
    let margin = width / 32;
    let (scale, lines) = text::fit_lines(
        &banner,
        width.saturating_sub(2 * margin),
        band,
        scaled(4, width).max(2),
        1,
    );
    let y = i64::from(band.saturating_sub(block_height(&lines, scale)) / 2);
    text::draw_centered_block(&mut canvas, &lines, y, scale, text::LIGHT_TEXT, Rgb([0, 0, 0]));

    // Per-tile keyword labels, kept clear of the promo band.
    let label_scale = scaled(2, width);
    let label_limit = i64::from(height.saturating_sub(promo_band_height(height)))
        - i64::from(text::line_height(label_scale));
    for (index, &(x, y, _, h)) in rects.iter().enumerate() {
        let Some(word) = spec.keywords().get(index) else {
            continue;
        };
        let pad = i64::from(gutter.max(6));
        let at_top = y + pad;
        let at_bottom = y + i64::from(h) - i64::from(text::line_height(label_scale)) - pad;
        let label_y = if variant.labels_at_top { at_top } else { at_bottom }.min(label_limit);
        text::draw_text_outlined(
            &mut canvas,
            &word.to_uppercase(),
            x + pad,
            label_y,
            label_scale,
            text::LIGHT_TEXT,
            Rgb([0, 0, 0]),
        );
    }

    draw_promo_footer(&mut canvas, spec, true, scaled(5, width));
    canvas
}

fn render_card(spec: &MemeSpec, variant: &CardVariant, photo: Option<&DynamicImage>) -> RgbImage {
    let (width, height) = (spec.width(), spec.height());
    let mut canvas = match photo {
        Some(photo) => {
            let mut plate = background::cover(photo, width, height);
            background::darken(&mut plate, 0.55);
            plate
        }
        None => background::style_gradient(&MemeStyle::Card, width, height),
    };

    let (headline, punchline, cta) = copy::card_copy(
        spec.vibe(),
        spec.moment(),
        spec.business_name(),
        spec.offer_text(),
        spec.entity_profile().map(|p| p.title.as_str()),
    );

    let accent_w = (width / 64).max(4);
    if variant.accent {
        draw::fill_rect(&mut canvas, 0, 0, accent_w, height, CTA_YELLOW);
    }

    let margin = width / 16;
    let col_x = i64::from(margin) + if variant.accent { i64::from(accent_w) } else { 0 };
    let col_w = frac(width, variant.text_frac).min(width.saturating_sub(margin * 2));

    let (h_scale, h_lines) =
        text::fit_lines(&headline, col_w, height / 4, scaled(7, width).max(2), 2);
    let mut cursor = i64::from(height / 6);
    for line in &h_lines {
        text::draw_text_outlined(
            &mut canvas,
            line,
            col_x,
            cursor,
            h_scale,
            text::LIGHT_TEXT,
            Rgb([0, 0, 0]),
        );
        cursor += i64::from(text::line_height(h_scale));
    }

    cursor += i64::from(height / 32);
    let (p_scale, p_lines) = text::fit_lines(&punchline, col_w, height / 4, scaled(3, width), 1);
    for line in &p_lines {
        text::draw_text_outlined(
            &mut canvas,
            line,
            col_x,
            cursor,
            p_scale,
            Rgb([230, 240, 255]),
            Rgb([0, 0, 0]),
        );
        cursor += i64::from(text::line_height(p_scale));
    }

    let banner_h = frac(height, variant.banner_frac).max(text::line_height(2) + 8);
    let footer_h = (height / 14).max(text::line_height(1) + 4);
    let banner_y = i64::from(height.saturating_sub(banner_h + footer_h + height / 32));
    let radius = (banner_h / 4).min(24);
    draw::fill_rounded_rect(
        &mut canvas,
        i64::from(margin),
        banner_y,
        width.saturating_sub(margin * 2),
        banner_h,
        radius,
        CTA_YELLOW,
    );
    let banner_text = format!("{} \u{b7} {cta}", spec.business_name().to_uppercase());
    let (b_scale, b_lines) = text::fit_lines(
        &banner_text,
        width.saturating_sub(margin * 4),
        banner_h,
        scaled(4, width).max(2),
        1,
    );
    let by = banner_y + i64::from(banner_h.saturating_sub(block_height(&b_lines, b_scale)) / 2);
    text::draw_centered_block(&mut canvas, &b_lines, by, b_scale, text::DARK_TEXT, CTA_YELLOW);

    let status = spec.moment().map_or("scanning", |m| m.label.as_str());
    let footer = format!("LIVE SIGNAL \u{b7} {} \u{b7} {status}", spec.vibe()).to_uppercase();
    let footer_y = i64::from(height.saturating_sub(footer_h));
    text::draw_text_outlined(
        &mut canvas,
        &footer,
        col_x,
        footer_y,
        scaled(2, width),
        Rgb([200, 208, 224]),
        Rgb([0, 0, 0]),
    );

    canvas
}

fn encode_png(canvas: RgbImage) -> Result<(Vec<u8>, u32, u32), ComposeError> {
    let (width, height) = (canvas.width(), canvas.height());
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok((bytes, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_style(style: MemeStyle) -> MemeSpec {
        MemeSpec::builder("corner deli", "2 FOR 1")
            .style(style)
            .keywords(vec!["mahomes".to_string(), "kelce".to_string()])
            .build()
            .unwrap()
    }

    fn has_pixel(canvas: &RgbImage, color: Rgb<u8>) -> bool {
        canvas.pixels().any(|p| p.0 == color.0)
    }

    #[test]
    fn classic_without_photos_still_carries_the_promotion() {
        let spec = spec_with_style(MemeStyle::Classic);
        let mut chooser = Chooser::for_spec(&spec);
        let canvas = render_classic(&spec, &CLASSIC_VARIANTS[0], &[], &mut chooser);
        assert_eq!((canvas.width(), canvas.height()), (1024, 1024));
        assert!(has_pixel(&canvas, CTA_YELLOW), "missing call-to-action band");
    }

    #[test]
    fn classic_variant_without_band_draws_promo_as_footer_text() {
        let spec = spec_with_style(MemeStyle::Classic);
        let mut chooser = Chooser::for_spec(&spec);
        assert!(!CLASSIC_VARIANTS[1].cta_band);
        let canvas = render_classic(&spec, &CLASSIC_VARIANTS[1], &[], &mut chooser);
        let footer_top = 1024 - promo_band_height(1024);
        let lit = canvas
            .enumerate_pixels()
            .filter(|(_, y, p)| *y >= footer_top && p.0 == text::LIGHT_TEXT.0)
            .count();
        assert!(lit > 0, "promo footer text missing");
    }

    #[test]
    fn grid_without_photos_renders_notice_and_band() {
        let spec = spec_with_style(MemeStyle::Grid { tiles: 4 });
        let canvas = render_grid(&spec, 4, &GRID_VARIANTS[0], &[]);
        assert_eq!((canvas.width(), canvas.height()), (1024, 1024));
        assert!(has_pixel(&canvas, CTA_YELLOW));
        assert!(has_pixel(&canvas, text::LIGHT_TEXT));
    }

    #[test]
    fn card_without_photo_renders_offer_banner() {
        let spec = spec_with_style(MemeStyle::Card);
        let canvas = render_card(&spec, &CARD_VARIANTS[0], None);
        assert!(has_pixel(&canvas, CTA_YELLOW));
        assert!(has_pixel(&canvas, text::DARK_TEXT));
    }

    #[test]
    fn photo_pool_orders_and_dedupes() {
        let profile = buzzmint_core::EntityProfile {
            name: "Patrick Mahomes".to_string(),
            title: "Patrick Mahomes".to_string(),
            description: None,
            summary: None,
            thumbnail_url: Some("https://img.example/portrait.jpg".to_string()),
            source_url: None,
            mentions: 3,
        };
        let spec = MemeSpec::builder("corner deli", "2 FOR 1")
            .background_url(Some("https://img.example/bg.png".to_string()))
            .entity_profile(Some(profile))
            .gallery(vec![
                "https://img.example/bg.png".to_string(),
                "https://img.example/crowd.jpg".to_string(),
            ])
            .build()
            .unwrap();
        let mut chooser = Chooser::for_spec(&spec);
        let pool = photo_pool(&spec, &mut chooser);
        assert_eq!(
            pool,
            vec![
                "https://img.example/bg.png".to_string(),
                "https://img.example/portrait.jpg".to_string(),
                "https://img.example/crowd.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn photo_pool_skips_portrait_when_disabled() {
        let profile = buzzmint_core::EntityProfile {
            name: "Patrick Mahomes".to_string(),
            title: "Patrick Mahomes".to_string(),
            description: None,
            summary: None,
            thumbnail_url: Some("https://img.example/portrait.jpg".to_string()),
            source_url: None,
            mentions: 3,
        };
        let spec = MemeSpec::builder("corner deli", "2 FOR 1")
            .entity_profile(Some(profile))
            .with_portrait(false)
            .build()
            .unwrap();
        let mut chooser = Chooser::for_spec(&spec);
        assert!(photo_pool(&spec, &mut chooser).is_empty());
    }

    #[test]
    fn encode_produces_png_magic() {
        let canvas = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let (bytes, width, height) = encode_png(canvas).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!((width, height), (8, 8));
    }
}
