use ab_glyph::{Font, Glyph, PxScale, ScaleFont, point};
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// Rasterize a single line of text into a tightly-bounded transparent
/// pixmap. Returns `None` when nothing would be drawn (empty string or
/// whitespace only).
///
/// The prompt overlay calls this once per trial; the result is blitted per
/// frame.
pub fn render_text_pixmap<F: Font>(
    text: &str,
    font: &F,
    size_px: f32,
    color: [u8; 4],
) -> Option<Pixmap> {
    let scale = PxScale::from(size_px);
    let scaled = font.as_scaled(scale);

    // Layout with the baseline at the ascent.
    let mut pen_x = 0.0f32;
    let mut previous = None;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = previous {
            pen_x += scaled.kern(prev, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, scaled.ascent()),
        });
        pen_x += scaled.h_advance(id);
        previous = Some(id);
    }

    // Union of the outlined pixel bounds.
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for glyph in &glyphs {
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let bounds = outlined.px_bounds();
            min_x = min_x.min(bounds.min.x);
            min_y = min_y.min(bounds.min.y);
            max_x = max_x.max(bounds.max.x);
            max_y = max_y.max(bounds.max.y);
        }
    }
    if min_x == f32::INFINITY {
        return None;
    }

    let width = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let height = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height)?;

    let stride = pixmap.width() as usize;
    let pixels = pixmap.pixels_mut();
    for glyph in &glyphs {
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                if coverage <= f32::EPSILON {
                    return;
                }
                let px = (x as f32 + bounds.min.x - min_x).floor() as i32;
                let py = (y as f32 + bounds.min.y - min_y).floor() as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let index = py as usize * stride + px as usize;

                // Premultiply by coverage, then source-over the existing pixel.
                let alpha = (coverage * color[3] as f32 / 255.0).clamp(0.0, 1.0);
                let src_r = (color[0] as f32 * alpha) as u8;
                let src_g = (color[1] as f32 * alpha) as u8;
                let src_b = (color[2] as f32 * alpha) as u8;
                let src_a = (alpha * 255.0) as u8;
                let dst = pixels[index];
                let inverse = 1.0 - alpha;
                let out_r = src_r.saturating_add((dst.red() as f32 * inverse) as u8);
                let out_g = src_g.saturating_add((dst.green() as f32 * inverse) as u8);
                let out_b = src_b.saturating_add((dst.blue() as f32 * inverse) as u8);
                let out_a = src_a.saturating_add((dst.alpha() as f32 * inverse) as u8);
                if let Some(blended) = PremultipliedColorU8::from_rgba(
                    out_r.min(out_a),
                    out_g.min(out_a),
                    out_b.min(out_a),
                    out_a,
                ) {
                    pixels[index] = blended;
                }
            });
        }
    }

    Some(pixmap)
}
