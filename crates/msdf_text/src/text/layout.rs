//! Draw recipes: everything needed to lay out and shade one string

use super::FontAtlas;
use crate::foundation::math::{transform, Mat4, Quat, Vec2, Vec3, Vec4};

/// Default pixel size for new recipes
pub const DEFAULT_PIXEL_SIZE: f32 = 64.0;

/// Horizontal alignment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlignment {
    /// Left edge at the origin
    #[default]
    Left,
    /// Centered on the origin
    Center,
    /// Right edge at the origin
    Right,
}

impl HAlignment {
    /// Alignment weight in `[0, 1]`
    pub const fn weight(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

/// Vertical alignment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlignment {
    /// Top edge at the origin
    #[default]
    Top,
    /// Centered on the origin
    Middle,
    /// Bottom edge at the origin
    Bottom,
}

impl VAlignment {
    /// Alignment weight in `[0, 1]`
    pub const fn weight(self) -> f32 {
        match self {
            Self::Top => 0.0,
            Self::Middle => 0.5,
            Self::Bottom => 1.0,
        }
    }
}

/// Layout and appearance parameters for one string draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecipe {
    /// Text to draw; may contain `\n`
    pub text: String,
    /// Em size in output pixels
    pub pixel_size: f32,
    /// Multiplier on every glyph advance
    pub character_spacing: f32,
    /// Multiplier on the font's line height
    pub line_spacing: f32,
    /// 0 = left, 0.5 = center, 1 = right
    pub horizontal_align: f32,
    /// 0 = top, 0.5 = middle, 1 = bottom
    pub vertical_align: f32,
    /// Foreground RGBA color
    pub color: Vec4,
    /// Advance leftwards instead of rightwards
    pub right_to_left: bool,
    /// Model transform applied at draw time
    pub model_matrix: Mat4,
}

impl Default for DrawRecipe {
    fn default() -> Self {
        Self {
            text: String::new(),
            pixel_size: DEFAULT_PIXEL_SIZE,
            character_spacing: 1.0,
            line_spacing: 1.0,
            horizontal_align: 0.0,
            vertical_align: 0.0,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            right_to_left: false,
            model_matrix: Mat4::identity(),
        }
    }
}

impl DrawRecipe {
    /// Recipe for `text` with default parameters
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the pixel size
    pub fn with_pixel_size(mut self, pixel_size: f32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    /// Set the character spacing multiplier
    pub fn with_character_spacing(mut self, spacing: f32) -> Self {
        self.character_spacing = spacing;
        self
    }

    /// Set the line spacing multiplier
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Set alignment weights
    pub fn with_alignment(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_align = horizontal;
        self.vertical_align = vertical;
        self
    }

    /// Set alignment from presets
    pub fn with_alignment_preset(self, horizontal: HAlignment, vertical: VAlignment) -> Self {
        self.with_alignment(horizontal.weight(), vertical.weight())
    }

    /// Set the foreground color
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Set right-to-left advance
    pub fn with_right_to_left(mut self, right_to_left: bool) -> Self {
        self.right_to_left = right_to_left;
        self
    }

    /// Set the model matrix directly
    pub fn with_model_matrix(mut self, matrix: Mat4) -> Self {
        self.model_matrix = matrix;
        self
    }

    /// Place the text with a position, rotation and scale
    ///
    /// Text is rotated first, then scaled along the layer axes, then moved.
    pub fn with_transform(self, position: Vec3, rotation: Quat, scale: Vec2) -> Self {
        self.with_model_matrix(transform::place(position, rotation, Vec3::new(scale.x, scale.y, 1.0)))
    }

    /// Place flat text on a 2D layer (angle in radians)
    pub fn with_screen_transform(self, position: Vec2, depth: f32, angle: f32, scale: Vec2) -> Self {
        self.with_model_matrix(transform::screen(position, depth, angle, scale))
    }

    /// Fingerprint of every field that affects vertex positions or UVs
    pub fn layout_key(&self, atlas: &FontAtlas) -> LayoutKey {
        LayoutKey {
            atlas_id: atlas.id(),
            font: atlas.name().to_string(),
            text: self.text.clone(),
            pixel_size: self.pixel_size.to_bits(),
            character_spacing: self.character_spacing.to_bits(),
            line_spacing: self.line_spacing.to_bits(),
            horizontal_align: self.horizontal_align.to_bits(),
            vertical_align: self.vertical_align.to_bits(),
            right_to_left: self.right_to_left,
        }
    }
}

/// Content fingerprint of a recipe
///
/// Holds exactly the layout-affecting fields, floats by bit pattern, plus the
/// identity of the atlas. Color and model matrix are render-time only and
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(dead_code)] // only compared and hashed
pub struct LayoutKey {
    atlas_id: u64,
    font: String,
    text: String,
    pixel_size: u32,
    character_spacing: u32,
    line_spacing: u32,
    horizontal_align: u32,
    vertical_align: u32,
    right_to_left: bool,
}
