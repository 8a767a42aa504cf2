//! Pixel-level primitives shared by the style renderers.
//!
//! Coordinates are `i64` and clipped to the canvas, so callers can position
//! shapes partially off-screen (outline passes do this constantly) without
//! bounds arithmetic at every call site.

use image::{Rgb, RgbImage};

/// Solid axis-aligned rectangle.
pub(crate) fn fill_rect(canvas: &mut RgbImage, x: i64, y: i64, w: u32, h: u32, color: Rgb<u8>) {
    for_each_pixel(canvas, x, y, w, h, |pixel| *pixel = color);
}

/// Rectangle blended over the existing pixels. `alpha` 0.0 leaves the canvas
/// untouched, 1.0 is a solid fill.
pub(crate) fn blend_rect(
    canvas: &mut RgbImage,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    color: Rgb<u8>,
    alpha: f32,
) {
    let alpha = alpha.clamp(0.0, 1.0);
    for_each_pixel(canvas, x, y, w, h, |pixel| {
        for (channel, overlay) in pixel.0.iter_mut().zip(color.0) {
            let blended =
                f32::from(*channel).mul_add(1.0 - alpha, f32::from(overlay) * alpha);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *channel = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    });
}

/// Solid rectangle with circular corners of the given radius.
pub(crate) fn fill_rounded_rect(
    canvas: &mut RgbImage,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    radius: u32,
    color: Rgb<u8>,
) {
    let radius = i64::from(radius.min(w / 2).min(h / 2));
    let (w_i, h_i) = (i64::from(w), i64::from(h));
    for dy in 0..h_i {
        for dx in 0..w_i {
            // Distance from the nearest corner center; pixels beyond the
            // radius in a corner square are outside the shape.
            let cx = if dx < radius {
                radius - dx
            } else if dx >= w_i - radius {
                dx - (w_i - radius - 1)
            } else {
                0
            };
            let cy = if dy < radius {
                radius - dy
            } else if dy >= h_i - radius {
                dy - (h_i - radius - 1)
            } else {
                0
            };
            if cx * cx + cy * cy > radius * radius {
                continue;
            }
            put_clipped(canvas, x + dx, y + dy, color);
        }
    }
}

/// Full-canvas vertical gradient from `top` to `bottom`.
pub(crate) fn vertical_gradient(
    width: u32,
    height: u32,
    top: Rgb<u8>,
    bottom: Rgb<u8>,
) -> RgbImage {
    RgbImage::from_fn(width, height, |_, y| {
        #[allow(clippy::cast_precision_loss)]
        let t = if height > 1 {
            y as f32 / (height - 1) as f32
        } else {
            0.0
        };
        let mut pixel = [0_u8; 3];
        for (i, channel) in pixel.iter_mut().enumerate() {
            let value = f32::from(top.0[i]).mul_add(1.0 - t, f32::from(bottom.0[i]) * t);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *channel = value.round().clamp(0.0, 255.0) as u8;
            }
        }
        Rgb(pixel)
    })
}

/// Mean perceptual luminance of a region, sampled every few pixels.
///
/// Used to pick text colors with enough contrast before drawing over a
/// photo. Returns mid-gray for a degenerate (fully clipped) region.
pub(crate) fn region_luminance(canvas: &RgbImage, x: i64, y: i64, w: u32, h: u32) -> f32 {
    const STEP: i64 = 4;
    let mut total = 0.0_f32;
    let mut samples = 0_u32;
    let (x1, y1) = (x + i64::from(w), y + i64::from(h));
    let mut yy = y.max(0);
    while yy < y1.min(i64::from(canvas.height())) {
        let mut xx = x.max(0);
        while xx < x1.min(i64::from(canvas.width())) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pixel = canvas.get_pixel(xx as u32, yy as u32);
            total += 0.2126 * f32::from(pixel.0[0])
                + 0.7152 * f32::from(pixel.0[1])
                + 0.0722 * f32::from(pixel.0[2]);
            samples += 1;
            xx += STEP;
        }
        yy += STEP;
    }
    if samples == 0 {
        return 128.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        total / samples as f32
    }
}

pub(crate) fn put_clipped(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (x, y) = (x as u32, y as u32);
    if x < canvas.width() && y < canvas.height() {
        canvas.put_pixel(x, y, color);
    }
}

fn for_each_pixel(
    canvas: &mut RgbImage,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    mut f: impl FnMut(&mut Rgb<u8>),
) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(w)).min(i64::from(canvas.width()));
    let y1 = (y + i64::from(h)).min(i64::from(canvas.height()));
    for yy in y0..y1 {
        for xx in x0..x1 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            f(canvas.get_pixel_mut(xx as u32, yy as u32));
        }
    }
}
