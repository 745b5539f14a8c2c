//! A drawable string bound to one font

use std::sync::Arc;

use super::glyph_mesh::{GlyphMesh, MeshBuffers, MeshError};
use super::layout::{DrawRecipe, HAlignment, VAlignment};
use super::measure::measure_string;
use super::text_renderer::{DrawRequest, TextRenderer};
use super::FontAtlas;
use crate::foundation::math::{constants::DEG_TO_RAD, transform, Mat4, Quat, Rect, Vec3, Vec4};

/// Text with its own recipe and cached mesh
///
/// Layout setters rebuild the mesh straight away (a no-op when the layout is
/// unchanged). Color and transform setters never touch geometry.
#[derive(Debug)]
pub struct DrawString {
    font: Arc<FontAtlas>,
    recipe: DrawRecipe,
    mesh: GlyphMesh,
}

impl DrawString {
    /// Centered, 64px, white text
    pub fn new(font: Arc<FontAtlas>, text: impl Into<String>) -> Result<Self, MeshError> {
        let recipe = DrawRecipe::new(text).with_alignment_preset(HAlignment::Center, VAlignment::Middle);
        Self::with_recipe(font, recipe)
    }

    /// Build from a complete recipe
    pub fn with_recipe(font: Arc<FontAtlas>, recipe: DrawRecipe) -> Result<Self, MeshError> {
        let mut mesh = GlyphMesh::new();
        mesh.rebuild(&recipe, &font)?;
        Ok(Self { font, recipe, mesh })
    }

    /// Apply a layout change, rolling the recipe back if the rebuild fails
    fn update_layout(&mut self, change: impl FnOnce(&mut DrawRecipe)) -> Result<bool, MeshError> {
        let previous = self.recipe.clone();
        change(&mut self.recipe);

        match self.mesh.rebuild(&self.recipe, &self.font) {
            Ok(rebuilt) => Ok(rebuilt),
            Err(err) => {
                log::warn!("Keeping previous text {:?}: {}", previous.text, err);
                self.recipe = previous;
                Err(err)
            }
        }
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<bool, MeshError> {
        let text = text.into();
        self.update_layout(|recipe| recipe.text = text)
    }

    /// Set the horizontal alignment weight
    pub fn set_horizontal_align(&mut self, align: f32) -> Result<bool, MeshError> {
        self.update_layout(|recipe| recipe.horizontal_align = align)
    }

    /// Set the vertical alignment weight
    pub fn set_vertical_align(&mut self, align: f32) -> Result<bool, MeshError> {
        self.update_layout(|recipe| recipe.vertical_align = align)
    }

    /// Set both alignments from presets
    pub fn set_alignment(&mut self, horizontal: HAlignment, vertical: VAlignment) -> Result<bool, MeshError> {
        self.update_layout(|recipe| {
            recipe.horizontal_align = horizontal.weight();
            recipe.vertical_align = vertical.weight();
        })
    }

    /// Set the pixel size
    pub fn set_pixel_size(&mut self, pixel_size: f32) -> Result<bool, MeshError> {
        self.update_layout(|recipe| recipe.pixel_size = pixel_size)
    }

    /// Set the character spacing multiplier
    pub fn set_character_spacing(&mut self, spacing: f32) -> Result<bool, MeshError> {
        self.update_layout(|recipe| recipe.character_spacing = spacing)
    }

    /// Set the line spacing multiplier
    pub fn set_line_spacing(&mut self, spacing: f32) -> Result<bool, MeshError> {
        self.update_layout(|recipe| recipe.line_spacing = spacing)
    }

    /// Set right-to-left advance
    pub fn set_right_to_left(&mut self, right_to_left: bool) -> Result<bool, MeshError> {
        self.update_layout(|recipe| recipe.right_to_left = right_to_left)
    }

    /// Switch to another font
    pub fn set_font(&mut self, font: Arc<FontAtlas>) -> Result<bool, MeshError> {
        let rebuilt = self.mesh.rebuild(&self.recipe, &font)?;
        self.font = font;
        Ok(rebuilt)
    }

    /// Set the foreground color
    pub fn set_color(&mut self, color: Vec4) {
        self.recipe.color = color;
    }

    /// Move the text, keeping rotation and scale
    pub fn set_position(&mut self, position: Vec3) {
        let m = &mut self.recipe.model_matrix;
        m.m14 = position.x;
        m.m24 = position.y;
        m.m34 = position.z;
    }

    /// Rotate about Z by `degrees`, keeping translation and scale
    pub fn set_angle(&mut self, degrees: f32) {
        let model = &self.recipe.model_matrix;
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), degrees * DEG_TO_RAD);
        self.recipe.model_matrix = transform::compose(transform::translation(model), rotation, transform::scale(model));
    }

    /// Replace the model matrix
    pub fn set_model_matrix(&mut self, matrix: Mat4) {
        self.recipe.model_matrix = matrix;
    }

    /// Queue this string for the next render pass
    pub fn enqueue(&self, renderer: &mut TextRenderer) {
        renderer.enqueue_request(DrawRequest::prebuilt(
            Arc::clone(&self.font),
            self.recipe.clone(),
            self.mesh.buffers(),
        ));
    }

    /// Bounding box of the laid-out text in pixels, before alignment
    pub fn bounds(&self) -> Rect {
        let ems = measure_string(
            &self.recipe.text,
            self.recipe.line_spacing,
            self.recipe.character_spacing,
            &self.font,
        );
        let px = self.recipe.pixel_size;
        Rect::new(ems.x * px, ems.y * px, ems.width * px, ems.height * px)
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.recipe.text
    }

    /// Current recipe
    pub fn recipe(&self) -> &DrawRecipe {
        &self.recipe
    }

    /// Font the string is laid out with
    pub fn font(&self) -> &Arc<FontAtlas> {
        &self.font
    }

    /// Cached mesh
    pub fn mesh(&self) -> &GlyphMesh {
        &self.mesh
    }

    /// Snapshot of the cached mesh buffers
    pub fn buffers(&self) -> MeshBuffers {
        self.mesh.buffers()
    }
}
