//! Hand-built atlases shared by the text tests

use std::collections::HashMap;
use std::path::Path;

use super::{FontAtlas, GlyphBounds, GlyphRecord};
use crate::assets::schema::tests::SAMPLE_SCHEMA;
use crate::assets::{MsdfAtlasInfo, MsdfMetrics};

/// A character no test atlas contains
pub(crate) const UNKNOWN: char = 'Z';

/// Unit-square glyphs: 'A' and 'B' cover `[0,0]..[1,1]` ems and advance by 1,
/// space advances by 0.5, line height is 1
pub(crate) fn square_font() -> FontAtlas {
    square_font_named("Square")
}

pub(crate) fn square_font_named(name: &str) -> FontAtlas {
    let unit = GlyphBounds::new(0.0, 0.0, 1.0, 1.0);
    let glyphs = HashMap::from([
        (
            'A',
            GlyphRecord::new(1.0)
                .with_plane_bounds(unit)
                .with_atlas_bounds(GlyphBounds::new(0.0, 0.0, 16.0, 16.0)),
        ),
        (
            'B',
            GlyphRecord::new(1.0)
                .with_plane_bounds(unit)
                .with_atlas_bounds(GlyphBounds::new(16.0, 0.0, 32.0, 16.0)),
        ),
        (' ', GlyphRecord::new(0.5)),
    ]);

    FontAtlas::new(
        name,
        MsdfAtlasInfo::new(32, 16, 4.0, 16.0),
        MsdfMetrics::with_line_height(1.0),
        glyphs,
        None,
    )
}

/// Write `<name>.json` (the sample schema) and `<name>.png` into `dir`
pub(crate) fn write_font_files(dir: &Path, name: &str) {
    std::fs::write(dir.join(format!("{name}.json")), SAMPLE_SCHEMA).unwrap();
    image::RgbaImage::from_pixel(128, 64, image::Rgba([255, 255, 255, 255]))
        .save(dir.join(format!("{name}.png")))
        .unwrap();
}
