//! Font atlas model for MSDF text rendering
//!
//! A [`FontAtlas`] is built once from an msdf-atlas-gen description (JSON
//! schema plus texture) and is read-only afterwards, so it can be shared
//! between any number of strings behind an `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::assets::{AssetError, ImageData, MsdfAtlasInfo, MsdfBounds, MsdfMetrics, MsdfSchema, YOrigin};
use crate::foundation::math::{Rect, Vec2};

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Whitespace advance (in ems) used when the atlas has no space glyph
pub const DEFAULT_WHITESPACE_ADVANCE: f32 = 0.25;

static NEXT_ATLAS_ID: AtomicU64 = AtomicU64::new(1);

/// Errors that can occur while loading a font atlas
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// The atlas texture or schema file does not exist
    #[error("Font asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// The schema file is not valid msdf-atlas-gen JSON
    #[error("Failed to parse atlas schema {}: {source}", path.display())]
    SchemaParse {
        /// Schema file that failed to parse
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The atlas texture could not be decoded
    #[error("Failed to load atlas texture {}: {source}", path.display())]
    Texture {
        /// Texture file that failed to load
        path: PathBuf,
        /// Underlying image error
        source: AssetError,
    },

    /// Reading a font file failed after it was found
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Edge coordinates of a glyph rectangle, kept exactly as the schema states them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphBounds {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl GlyphBounds {
    /// Create bounds from left, top, right and bottom edges
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// `(left, top)` corner
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// `(right, bottom)` corner
    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right, self.bottom)
    }

    /// Normalized rectangle covering the same area
    pub fn to_rect(&self) -> Rect {
        Rect::from_ltrb(self.left, self.top, self.right, self.bottom)
    }
}

impl From<MsdfBounds> for GlyphBounds {
    fn from(bounds: MsdfBounds) -> Self {
        Self::new(bounds.left, bounds.top, bounds.right, bounds.bottom)
    }
}

/// Metric and geometry data for one character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphRecord {
    /// Horizontal pen advance in ems
    pub advance: f32,
    /// Quad placement relative to the pen in ems; `None` for invisible glyphs
    pub plane_bounds: Option<GlyphBounds>,
    /// Glyph rectangle in atlas pixels
    pub atlas_bounds: Option<GlyphBounds>,
}

impl GlyphRecord {
    /// A glyph that only advances the pen
    pub const fn new(advance: f32) -> Self {
        Self {
            advance,
            plane_bounds: None,
            atlas_bounds: None,
        }
    }

    /// Attach quad geometry
    pub fn with_plane_bounds(mut self, bounds: GlyphBounds) -> Self {
        self.plane_bounds = Some(bounds);
        self
    }

    /// Attach the atlas rectangle
    pub fn with_atlas_bounds(mut self, bounds: GlyphBounds) -> Self {
        self.atlas_bounds = Some(bounds);
        self
    }

    /// True when the glyph produces a quad
    pub const fn has_geometry(&self) -> bool {
        self.plane_bounds.is_some()
    }
}

impl From<&crate::assets::MsdfGlyph> for GlyphRecord {
    fn from(glyph: &crate::assets::MsdfGlyph) -> Self {
        Self {
            advance: glyph.advance,
            plane_bounds: glyph.plane_bounds.map(GlyphBounds::from),
            atlas_bounds: glyph.atlas_bounds.map(GlyphBounds::from),
        }
    }
}

/// A loaded MSDF font: atlas parameters, metrics and the glyph table
#[derive(Debug, Clone)]
pub struct FontAtlas {
    id: u64,
    name: String,
    atlas: MsdfAtlasInfo,
    metrics: MsdfMetrics,
    glyphs: HashMap<char, GlyphRecord>,
    whitespace_advance: f32,
    texture: Option<ImageData>,
}

impl FontAtlas {
    /// Build an atlas from an already populated glyph table
    pub fn new(
        name: impl Into<String>,
        atlas: MsdfAtlasInfo,
        metrics: MsdfMetrics,
        glyphs: HashMap<char, GlyphRecord>,
        texture: Option<ImageData>,
    ) -> Self {
        let whitespace_advance = glyphs
            .get(&' ')
            .map_or(DEFAULT_WHITESPACE_ADVANCE, |space| space.advance);

        Self {
            id: NEXT_ATLAS_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            atlas,
            metrics,
            glyphs,
            whitespace_advance,
            texture,
        }
    }

    /// Build an atlas from a parsed schema
    ///
    /// When a character appears twice the later entry wins.
    pub fn from_schema(name: impl Into<String>, schema: MsdfSchema, texture: Option<ImageData>) -> Self {
        let name = name.into();
        let mut glyphs = HashMap::with_capacity(schema.glyphs.len());

        for glyph in &schema.glyphs {
            let ch = glyph.unicode;
            if glyphs.insert(ch, GlyphRecord::from(glyph)).is_some() {
                log::warn!("Font '{}': duplicate glyph for {:?}, keeping the last one", name, ch);
            }
        }

        if let Some(texture) = &texture {
            if texture.dimensions() != (schema.atlas.width, schema.atlas.height) {
                log::warn!(
                    "Font '{}': texture is {}x{} but schema declares {}x{}",
                    name, texture.width, texture.height, schema.atlas.width, schema.atlas.height
                );
            }
        }

        Self::new(name, schema.atlas, schema.metrics, glyphs, texture)
    }

    /// Read and parse a schema file, and optionally decode its texture
    ///
    /// Callers are expected to have checked that the files exist; see
    /// [`crate::text::DirectoryFontSource`].
    pub fn from_files(name: impl Into<String>, schema_path: &Path, texture_path: Option<&Path>) -> FontResult<Self> {
        let bytes = std::fs::read(schema_path).map_err(|source| FontError::Io {
            path: schema_path.to_path_buf(),
            source,
        })?;

        let schema = MsdfSchema::from_slice(&bytes).map_err(|source| FontError::SchemaParse {
            path: schema_path.to_path_buf(),
            source,
        })?;

        let texture = texture_path
            .map(|path| {
                ImageData::from_file(path).map_err(|source| FontError::Texture {
                    path: path.to_path_buf(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self::from_schema(name, schema, texture))
    }

    /// Process-unique id assigned at construction
    ///
    /// Atlases loaded separately never share an id, even under the same name.
    /// Clones keep the id of their source, whose glyph data they duplicate.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Font identifier this atlas was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a glyph; `None` for characters the atlas does not cover
    pub fn glyph(&self, ch: char) -> Option<&GlyphRecord> {
        self.glyphs.get(&ch)
    }

    /// Number of glyphs in the table
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Iterate over all characters and their glyphs
    pub fn glyphs(&self) -> impl Iterator<Item = (char, &GlyphRecord)> {
        self.glyphs.iter().map(|(ch, glyph)| (*ch, glyph))
    }

    /// Atlas texture parameters
    pub fn atlas_info(&self) -> &MsdfAtlasInfo {
        &self.atlas
    }

    /// Vertical metrics
    pub fn metrics(&self) -> &MsdfMetrics {
        &self.metrics
    }

    /// Distance between baselines, in ems
    pub fn line_height(&self) -> f32 {
        self.metrics.line_height
    }

    /// Distance field range in atlas pixels (anti-aliasing width)
    pub fn distance_range(&self) -> f32 {
        self.atlas.distance_range
    }

    /// Em size in atlas pixels
    pub fn em_pixel_size(&self) -> f32 {
        self.atlas.size
    }

    /// Vertical origin of atlas-space Y coordinates
    pub fn y_origin(&self) -> YOrigin {
        self.atlas.y_origin
    }

    /// Advance of the space glyph, or [`DEFAULT_WHITESPACE_ADVANCE`]
    ///
    /// Layout does not read this: it walks whatever glyphs the table holds and
    /// skips characters it lacks. Exposed for callers that pad or place a caret
    /// by whole spaces.
    pub fn whitespace_advance(&self) -> f32 {
        self.whitespace_advance
    }

    /// Texture size in pixels, as floats for shader parameters
    pub fn texture_size(&self) -> Vec2 {
        Vec2::new(self.atlas.width as f32, self.atlas.height as f32)
    }

    /// Size of one texel in normalized texture coordinates
    pub fn texel_size(&self) -> Vec2 {
        let size = self.texture_size();
        Vec2::new(1.0 / size.x, 1.0 / size.y)
    }

    /// Decoded texture, if it was loaded
    pub fn texture(&self) -> Option<&ImageData> {
        self.texture.as_ref()
    }
}
