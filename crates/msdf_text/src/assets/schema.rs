//! msdf-atlas-gen JSON schema
//!
//! Mirrors the layout written by `msdf-atlas-gen -json`. Only the fields the
//! layout code consumes are required; everything else has a default.

use serde::{de, Deserialize, Deserializer};

/// Root of an atlas description file
#[derive(Debug, Clone, Deserialize)]
pub struct MsdfSchema {
    /// Texture-level parameters
    pub atlas: MsdfAtlasInfo,
    /// Font-wide vertical metrics
    pub metrics: MsdfMetrics,
    /// One entry per packed glyph
    pub glyphs: Vec<MsdfGlyph>,
}

impl MsdfSchema {
    /// Parse a schema from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// `atlas` block
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsdfAtlasInfo {
    /// Generator type (`msdf`, `mtsdf`, `sdf`, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Distance field range in atlas pixels
    pub distance_range: f32,
    /// Em size in atlas pixels
    pub size: f32,
    /// Texture width in pixels
    pub width: u32,
    /// Texture height in pixels
    pub height: u32,
    /// Vertical origin of `atlasBounds`
    #[serde(default)]
    pub y_origin: YOrigin,
}

impl MsdfAtlasInfo {
    /// Describe an MSDF texture of the given size
    pub fn new(width: u32, height: u32, distance_range: f32, size: f32) -> Self {
        Self {
            kind: "msdf".to_string(),
            distance_range,
            size,
            width,
            height,
            y_origin: YOrigin::default(),
        }
    }
}

/// Which edge of the texture `atlasBounds` Y coordinates are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YOrigin {
    /// Y grows upwards from the bottom edge (generator default)
    #[default]
    Bottom,
    /// Y grows downwards from the top edge
    Top,
}

/// `metrics` block, all values in ems
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsdfMetrics {
    /// Em size (normally 1)
    #[serde(default = "default_em_size")]
    pub em_size: f32,
    /// Distance between baselines
    pub line_height: f32,
    /// Ascender height
    #[serde(default)]
    pub ascender: f32,
    /// Descender depth (usually negative)
    #[serde(default)]
    pub descender: f32,
    /// Underline position
    #[serde(default)]
    pub underline_y: f32,
    /// Underline stroke thickness
    #[serde(default)]
    pub underline_thickness: f32,
}

impl MsdfMetrics {
    /// Metrics for a 1-em font with the given line height and no other data
    pub const fn with_line_height(line_height: f32) -> Self {
        Self {
            em_size: 1.0,
            line_height,
            ascender: 0.0,
            descender: 0.0,
            underline_y: 0.0,
            underline_thickness: 0.0,
        }
    }
}

const fn default_em_size() -> f32 {
    1.0
}

/// One glyph entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsdfGlyph {
    /// Character this glyph renders
    #[serde(deserialize_with = "deserialize_unicode")]
    pub unicode: char,
    /// Pen advance in ems
    pub advance: f32,
    /// Quad placement relative to the pen, in ems
    #[serde(default)]
    pub plane_bounds: Option<MsdfBounds>,
    /// Glyph rectangle inside the atlas texture, in pixels
    #[serde(default)]
    pub atlas_bounds: Option<MsdfBounds>,
}

/// Edge coordinates of a glyph rectangle
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MsdfBounds {
    /// Left edge
    pub left: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Right edge
    pub right: f32,
    /// Top edge
    pub top: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUnicode {
    CodePoint(u32),
    Text(String),
}

// Generators write the code point as a number; hand-edited files often use the
// character itself. Anything that isn't exactly one scalar value is an error.
fn deserialize_unicode<'de, D>(deserializer: D) -> Result<char, D::Error>
where
    D: Deserializer<'de>,
{
    match RawUnicode::deserialize(deserializer)? {
        RawUnicode::CodePoint(code) => char::from_u32(code)
            .ok_or_else(|| de::Error::custom(format!("unicode {code:#x} is not a valid character"))),
        RawUnicode::Text(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok(ch),
                _ => Err(de::Error::custom(format!("unicode {text:?} is not a single character"))),
            }
        }
    }
}
