//! Background plates: style gradients and fetched photos.
//!
//! Photos come from post galleries and entity thumbnails, which are both
//! unreliable, so every fetch failure degrades to `None` and the caller
//! falls back to the style gradient. A meme always renders.

use image::{imageops, DynamicImage, Rgb, RgbImage};
use tracing::{debug, warn};

use crate::draw::vertical_gradient;
use crate::spec::MemeStyle;

/// Hard cap on downloaded image bytes. Anything larger is dropped.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Sigma for the blurred backdrop behind contained photos.
const BACKDROP_BLUR_SIGMA: f32 = 12.0;

/// Darkening factor applied to blurred backdrops so foreground text reads.
const BACKDROP_DIM: f32 = 0.82;

/// Per-style gradient endpoints, dark enough for light text by default.
fn style_palette(style: &MemeStyle) -> (Rgb<u8>, Rgb<u8>) {
    match style {
        MemeStyle::Classic => (Rgb([18, 22, 44]), Rgb([44, 52, 88])),
        MemeStyle::Grid { .. } => (Rgb([10, 15, 30]), Rgb([34, 44, 70])),
        MemeStyle::Card => (Rgb([10, 20, 50]), Rgb([40, 60, 130])),
    }
}

/// Full-canvas gradient plate for a style.
pub(crate) fn style_gradient(style: &MemeStyle, width: u32, height: u32) -> RgbImage {
    let (top, bottom) = style_palette(style);
    vertical_gradient(width, height, top, bottom)
}

/// Download and decode one image. Any failure, unsupported format, oversized
/// body, or decode error included, logs and returns `None`.
pub(crate) async fn fetch_image(client: &reqwest::Client, url: &str) -> Option<DynamicImage> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(error) => {
            warn!(%url, %error, "background fetch failed");
            return None;
        }
    };
    if !response.status().is_success() {
        debug!(%url, status = response.status().as_u16(), "background fetch non-success");
        return None;
    }
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(%url, %error, "background body read failed");
            return None;
        }
    };
    if bytes.len() > MAX_IMAGE_BYTES {
        debug!(%url, len = bytes.len(), "background image too large, skipping");
        return None;
    }
    match image::load_from_memory(&bytes) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            debug!(%url, %error, "background decode failed, skipping");
            None
        }
    }
}

/// Scale to fill the target exactly, cropping overflow from the center.
pub(crate) fn cover(photo: &DynamicImage, width: u32, height: u32) -> RgbImage {
    photo
        .resize_to_fill(width, height, imageops::FilterType::Lanczos3)
        .to_rgb8()
}

/// Letterbox-free contain: the photo scaled to fit sits centered over a
/// blurred and dimmed cover of itself, so no canvas pixel is ever bare.
pub(crate) fn contain_on_blur(photo: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let mut plate = cover(photo, width, height);
    plate = imageops::blur(&plate, BACKDROP_BLUR_SIGMA);
    for pixel in plate.pixels_mut() {
        for channel in &mut pixel.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *channel = (f32::from(*channel) * BACKDROP_DIM) as u8;
            }
        }
    }

    let contained = photo
        .resize(width, height, imageops::FilterType::Lanczos3)
        .to_rgb8();
    let offset_x = i64::from((width.saturating_sub(contained.width())) / 2);
    let offset_y = i64::from((height.saturating_sub(contained.height())) / 2);
    imageops::overlay(&mut plate, &contained, offset_x, offset_y);
    plate
}

/// Uniformly darken a plate in place. `factor` of 1.0 is a no-op.
pub(crate) fn darken(plate: &mut RgbImage, factor: f32) {
    for pixel in plate.pixels_mut() {
        for channel in &mut pixel.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *channel = (f32::from(*channel) * factor).clamp(0.0, 255.0) as u8;
            }
        }
    }
}
