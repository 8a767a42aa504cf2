//! Bitmap text: 8x8 glyphs scaled up to poster sizes.
//!
//! The glyph set is the compiled-in `font8x8` tables, so rendering needs no
//! font files and produces identical pixels on every platform. Glyphs are
//! monospace, which makes wrapping and centering exact arithmetic on
//! character counts.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

use crate::draw::put_clipped;

/// Edge of one unscaled glyph cell.
pub(crate) const GLYPH_SIZE: u32 = 8;

pub(crate) const LIGHT_TEXT: Rgb<u8> = Rgb([245, 245, 245]);
pub(crate) const DARK_TEXT: Rgb<u8> = Rgb([18, 22, 32]);
const BLACK_STROKE: Rgb<u8> = Rgb([0, 0, 0]);

/// Luminance above which a background counts as light and takes dark text.
const LIGHT_BACKGROUND: f32 = 140.0;

/// Pixel width of `text` at `scale`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Line advance at `scale`, including inter-line spacing.
pub(crate) fn line_height(scale: u32) -> u32 {
    GLYPH_SIZE * scale + 2 * scale
}

/// `(fill, stroke)` pair with guaranteed contrast against a background of the
/// given luminance.
pub(crate) fn contrast_colors(luminance: f32) -> (Rgb<u8>, Rgb<u8>) {
    if luminance > LIGHT_BACKGROUND {
        (DARK_TEXT, LIGHT_TEXT)
    } else {
        (LIGHT_TEXT, BLACK_STROKE)
    }
}

fn glyph_for(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch))
}

/// Draw one glyph with its top-left corner at `(x, y)`. Characters outside
/// the glyph tables render as blank space (the pen still advances).
fn draw_glyph(canvas: &mut RgbImage, ch: char, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
    let Some(glyph) = glyph_for(ch) else {
        return;
    };
    let scale_i = i64::from(scale);
    for (row_idx, row) in glyph.iter().enumerate() {
        for bit in 0..8_u8 {
            if row >> bit & 1 == 0 {
                continue;
            }
            let px = x + i64::from(bit) * scale_i;
            let py = y + row_idx as i64 * scale_i;
            for dy in 0..scale_i {
                for dx in 0..scale_i {
                    put_clipped(canvas, px + dx, py + dy, color);
                }
            }
        }
    }
}

pub(crate) fn draw_text(
    canvas: &mut RgbImage,
    text: &str,
    x: i64,
    y: i64,
    scale: u32,
    color: Rgb<u8>,
) {
    let advance = i64::from(GLYPH_SIZE * scale);
    for (i, ch) in text.chars().enumerate() {
        draw_glyph(canvas, ch, x + i as i64 * advance, y, scale, color);
    }
}

/// Text with an eight-direction stroke behind it, so it stays readable over
/// any photo.
pub(crate) fn draw_text_outlined(
    canvas: &mut RgbImage,
    text: &str,
    x: i64,
    y: i64,
    scale: u32,
    fill: Rgb<u8>,
    stroke: Rgb<u8>,
) {
    let offset = i64::from((scale / 3).max(1));
    for (dx, dy) in [
        (-offset, 0),
        (offset, 0),
        (0, -offset),
        (0, offset),
        (-offset, -offset),
        (offset, -offset),
        (-offset, offset),
        (offset, offset),
    ] {
        draw_text(canvas, text, x + dx, y + dy, scale, stroke);
    }
    draw_text(canvas, text, x, y, scale, fill);
}

/// Greedy word wrap to a pixel width. Words longer than a full line are hard
/// broken so no line ever overflows.
pub(crate) fn wrap_text(text: &str, scale: u32, max_width: u32) -> Vec<String> {
    let max_chars = (max_width / (GLYPH_SIZE * scale)).max(1) as usize;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();
        let joined = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if joined <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if word_len <= max_chars {
            current.push_str(word);
        } else {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_chars) {
                lines.push(chunk.iter().collect());
            }
            // A final full-width chunk starts a fresh line like any other.
            if let Some(last) = lines.pop() {
                current = last;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Find the largest scale at or below `start_scale` whose wrapped lines fit
/// the given box, and return the scale with its lines. Bottoms out at
/// `min_scale` rather than failing; tiny canvases get cramped text, not an
/// error.
pub(crate) fn fit_lines(
    text: &str,
    max_width: u32,
    max_height: u32,
    start_scale: u32,
    min_scale: u32,
) -> (u32, Vec<String>) {
    let text = text.trim();
    let min_scale = min_scale.max(1);
    if text.is_empty() {
        return (min_scale, Vec::new());
    }

    let mut scale = start_scale.max(min_scale);
    while scale > min_scale {
        let lines = wrap_text(text, scale, max_width);
        let widest = lines.iter().map(|l| text_width(l, scale)).max().unwrap_or(0);
        #[allow(clippy::cast_possible_truncation)]
        let total_height = line_height(scale) * lines.len() as u32;
        if widest <= max_width && total_height <= max_height {
            return (scale, lines);
        }
        scale -= 1;
    }
    (min_scale, wrap_text(text, min_scale, max_width))
}

/// Draw wrapped lines centered horizontally, top edge at `y`. Returns the y
/// just below the block.
pub(crate) fn draw_centered_block(
    canvas: &mut RgbImage,
    lines: &[String],
    y: i64,
    scale: u32,
    fill: Rgb<u8>,
    stroke: Rgb<u8>,
) -> i64 {
    let canvas_width = i64::from(canvas.width());
    let mut cursor = y;
    for line in lines {
        let width = i64::from(text_width(line, scale));
        let x = (canvas_width - width) / 2;
        draw_text_outlined(canvas, line, x, cursor, scale, fill, stroke);
        cursor += i64::from(line_height(scale));
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_width_is_monospace_arithmetic() {
        assert_eq!(text_width("ABCD", 2), 4 * 8 * 2);
        assert_eq!(text_width("", 3), 0);
    }

    #[test]
    fn wrap_respects_max_width() {
        let lines = wrap_text("the quick brown fox jumps", 1, 10 * 8);
        assert!(!lines.is_empty());
        for line in &lines {
            assert!(line.chars().count() <= 10, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        let lines = wrap_text("HYPE", 2, 1024);
        assert_eq!(lines, vec!["HYPE".to_string()]);
    }

    #[test]
    fn wrap_hard_breaks_oversized_words() {
        let lines = wrap_text("ABCDEFGHIJKLMNOP", 1, 4 * 8);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ABCD");
        assert_eq!(lines[3], "MNOP");
    }

    #[test]
    fn fit_shrinks_until_text_fits() {
        let (scale, lines) = fit_lines("REACTION CHECK LIVE", 320, 200, 12, 1);
        assert!(scale >= 1);
        for line in &lines {
            assert!(text_width(line, scale) <= 320);
        }
        #[allow(clippy::cast_possible_truncation)]
        let total = line_height(scale) * lines.len() as u32;
        assert!(total <= 200);
    }

    #[test]
    fn fit_bottoms_out_at_min_scale() {
        let (scale, lines) = fit_lines("ABSURDLY LONG HEADLINE TEXT", 64, 16, 6, 2);
        assert_eq!(scale, 2);
        assert!(!lines.is_empty());
    }

    #[test]
    fn empty_text_fits_trivially() {
        let (_, lines) = fit_lines("   ", 100, 100, 4, 1);
        assert!(lines.is_empty());
    }

    #[test]
    fn contrast_flips_on_light_backgrounds() {
        assert_eq!(contrast_colors(200.0), (DARK_TEXT, LIGHT_TEXT));
        assert_eq!(contrast_colors(60.0), (LIGHT_TEXT, Rgb([0, 0, 0])));
    }

    #[test]
    fn drawing_off_canvas_does_not_panic() {
        let mut canvas = RgbImage::from_pixel(16, 16, Rgb([0, 0, 0]));
        draw_text_outlined(&mut canvas, "WAY TOO BIG", -40, -40, 6, LIGHT_TEXT, Rgb([0, 0, 0]));
    }

    #[test]
    fn drawing_marks_pixels() {
        let mut canvas = RgbImage::from_pixel(64, 32, Rgb([0, 0, 0]));
        draw_text(&mut canvas, "A", 4, 4, 2, LIGHT_TEXT);
        let lit = canvas.pixels().filter(|p| p.0 == LIGHT_TEXT.0).count();
        assert!(lit > 0, "expected glyph pixels to be drawn");
    }

    #[test]
    fn unknown_glyph_is_skipped_silently() {
        let mut canvas = RgbImage::from_pixel(64, 32, Rgb([0, 0, 0]));
        draw_text(&mut canvas, "\u{1F600}", 0, 0, 2, LIGHT_TEXT);
        let lit = canvas.pixels().filter(|p| p.0 == LIGHT_TEXT.0).count();
        assert_eq!(lit, 0);
    }
}
