//! String measurement
//!
//! Computes the tight bounding box of laid-out text without producing any
//! geometry. The result is in ems; multiply by the pixel size to get pixels.

use super::FontAtlas;
use crate::foundation::math::Rect;

/// Measure the bounding box of `text` laid out with the given spacing
///
/// Walks the string with a pen: `\n` returns the carriage to 0 and moves
/// down by `line_spacing * line_height`; every known glyph advances the
/// carriage by `advance * character_spacing`; glyphs with plane bounds
/// contribute their translated rectangle to the union. Characters missing
/// from the atlas are skipped without advancing.
///
/// Returns [`Rect::ZERO`] when no glyph contributes geometry.
pub fn measure_string(text: &str, line_spacing: f32, character_spacing: f32, atlas: &FontAtlas) -> Rect {
    let mut bounds: Option<Rect> = None;

    let mut carriage = 0.0f32;
    let mut line = 0.0f32;

    for ch in text.chars() {
        if ch == '\n' {
            carriage = 0.0;
            line += line_spacing * atlas.line_height();
            continue;
        }

        let Some(glyph) = atlas.glyph(ch) else {
            log::trace!("measure: no glyph for {:?} in '{}'", ch, atlas.name());
            continue;
        };

        if let Some(plane) = &glyph.plane_bounds {
            let placed = plane.to_rect().translated(carriage, line);
            bounds = Some(match bounds {
                Some(current) => current.union(&placed),
                None => placed,
            });
        }

        carriage += glyph.advance * character_spacing;
    }

    bounds.unwrap_or(Rect::ZERO)
}
