//! Text draw queue and render flush
//!
//! Strings are queued as plain [`DrawRequest`] records during the frame and
//! submitted in one [`TextRenderer::render_all`] call. Requests are grouped by
//! font so each atlas texture is bound once, in the order fonts were first
//! queued. The GPU side is whatever implements [`TextRenderBackend`].

use std::sync::Arc;

use super::font_atlas::FontError;
use super::glyph_mesh::{GlyphMesh, MeshBuffers, MeshError};
use super::layout::DrawRecipe;
use super::FontAtlas;
use crate::config::TextConfig;
use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};

/// Shader technique used for a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextTechnique {
    /// Text above the large-text threshold
    LargeText,
    /// Text at or below the threshold
    SmallText,
}

impl TextTechnique {
    /// Pick the technique for text drawn at `pixel_size`
    pub fn for_pixel_size(pixel_size: f32, threshold: f32) -> Self {
        if pixel_size > threshold {
            Self::LargeText
        } else {
            Self::SmallText
        }
    }

    /// Technique name as the shader effect knows it
    pub const fn name(self) -> &'static str {
        match self {
            Self::LargeText => "LargeText",
            Self::SmallText => "SmallText",
        }
    }
}

/// Per-font state bound once before that font's draws
#[derive(Debug, Clone, Copy)]
pub struct FontPass<'a> {
    /// Atlas whose texture the draws sample
    pub font: &'a FontAtlas,
    /// View matrix with the Y flip applied
    pub view_projection: Mat4,
    /// Atlas texture size in pixels, for normalizing UVs
    pub texture_size: Vec2,
    /// Distance range of the atlas in pixels
    pub px_range: f32,
}

/// One indexed triangle-list draw
#[derive(Debug, Clone, Copy)]
pub struct TextDrawCall<'a> {
    /// Model matrix of the string
    pub world_matrix: Mat4,
    /// Foreground color
    pub color: Vec4,
    /// Technique chosen from the pixel size
    pub technique: TextTechnique,
    /// Geometry to draw
    pub buffers: &'a MeshBuffers,
}

/// Error reported by a render backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Text render backend error: {0}")]
pub struct RenderError(pub String);

/// GPU side of text rendering
///
/// Calls arrive as `begin_font`, any number of `draw`, `end_font`, repeated
/// for each font with queued text.
pub trait TextRenderBackend {
    /// Bind the atlas texture and per-font shader parameters
    fn begin_font(&mut self, pass: &FontPass<'_>) -> Result<(), RenderError>;

    /// Draw one string
    fn draw(&mut self, call: &TextDrawCall<'_>) -> Result<(), RenderError>;

    /// Finish the font's draws
    fn end_font(&mut self, font: &FontAtlas) -> Result<(), RenderError>;
}

/// Errors from the text pipeline as a whole
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// Font loading failed
    #[error(transparent)]
    Font(#[from] FontError),

    /// Geometry could not be built
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The backend rejected a call
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A queued string draw
#[derive(Debug, Clone)]
pub struct DrawRequest {
    /// Font to draw with
    pub font: Arc<FontAtlas>,
    /// Layout and appearance
    pub recipe: DrawRecipe,
    /// Prebuilt geometry; built at flush time when absent
    pub mesh: Option<MeshBuffers>,
}

impl DrawRequest {
    /// Request whose mesh is built during the flush
    pub fn new(font: Arc<FontAtlas>, recipe: DrawRecipe) -> Self {
        Self {
            font,
            recipe,
            mesh: None,
        }
    }

    /// Request carrying geometry that matches `recipe`
    pub fn prebuilt(font: Arc<FontAtlas>, recipe: DrawRecipe, mesh: MeshBuffers) -> Self {
        Self {
            font,
            recipe,
            mesh: Some(mesh),
        }
    }
}

/// Collects draw requests for a frame and submits them to a backend
#[derive(Debug)]
pub struct TextRenderer {
    config: TextConfig,
    queue: Vec<DrawRequest>,
    scratch: GlyphMesh,
}

impl TextRenderer {
    /// Create a renderer with an empty queue
    pub fn new(config: TextConfig) -> Self {
        Self {
            config,
            queue: Vec::new(),
            scratch: GlyphMesh::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Recipe for `text` at the configured default pixel size
    pub fn recipe(&self, text: impl Into<String>) -> DrawRecipe {
        DrawRecipe::new(text).with_pixel_size(self.config.default_pixel_size)
    }

    /// Queue `recipe` to be laid out and drawn with `font`
    pub fn enqueue(&mut self, font: Arc<FontAtlas>, recipe: DrawRecipe) {
        self.enqueue_request(DrawRequest::new(font, recipe));
    }

    /// Queue a request as-is
    pub fn enqueue_request(&mut self, request: DrawRequest) {
        self.queue.push(request);
    }

    /// Requests waiting for the next flush, in submission order
    pub fn pending(&self) -> &[DrawRequest] {
        &self.queue
    }

    /// Discard all queued requests
    pub fn flush(&mut self) {
        if !self.queue.is_empty() {
            log::debug!("Discarding {} queued text draws", self.queue.len());
        }
        self.queue.clear();
    }

    /// Submit every queued request to `backend`
    ///
    /// Returns the number of draw calls issued. The queue is empty afterwards,
    /// including when an error cuts the pass short.
    pub fn render_all<B>(&mut self, backend: &mut B, view: &Mat4) -> Result<usize, TextError>
    where
        B: TextRenderBackend + ?Sized,
    {
        let requests = std::mem::take(&mut self.queue);
        if requests.is_empty() {
            return Ok(0);
        }

        let view_projection = if self.config.flip_y {
            view * Mat4::new_nonuniform_scaling(&Vec3::new(1.0, -1.0, 1.0))
        } else {
            *view
        };

        let batches = group_by_font(requests);
        let font_count = batches.len();
        let mut draws = 0;

        for (font, batch) in batches {
            backend.begin_font(&FontPass {
                font: &font,
                view_projection,
                texture_size: font.texture_size(),
                px_range: font.distance_range(),
            })?;

            // The pass is closed even when a draw fails; the draw error wins
            let drawn = self.draw_batch(backend, &font, &batch, &mut draws);
            let closed = backend.end_font(&font);
            drawn?;
            closed?;
        }

        log::trace!("Rendered {} text draws across {} fonts", draws, font_count);
        Ok(draws)
    }

    fn draw_batch<B>(
        &mut self,
        backend: &mut B,
        font: &FontAtlas,
        batch: &[DrawRequest],
        draws: &mut usize,
    ) -> Result<(), TextError>
    where
        B: TextRenderBackend + ?Sized,
    {
        for request in batch {
            if request.recipe.text.is_empty() {
                continue;
            }

            let buffers = match &request.mesh {
                Some(mesh) => mesh.clone(),
                None => {
                    self.scratch.rebuild(&request.recipe, font)?;
                    self.scratch.buffers()
                }
            };
            if buffers.is_empty() {
                continue;
            }

            backend.draw(&TextDrawCall {
                world_matrix: request.recipe.model_matrix,
                color: request.recipe.color,
                technique: TextTechnique::for_pixel_size(request.recipe.pixel_size, self.config.large_text_threshold),
                buffers: &buffers,
            })?;
            *draws += 1;
        }
        Ok(())
    }
}

/// Split requests into per-font batches, fonts in first-seen order
fn group_by_font(requests: Vec<DrawRequest>) -> Vec<(Arc<FontAtlas>, Vec<DrawRequest>)> {
    let mut batches: Vec<(Arc<FontAtlas>, Vec<DrawRequest>)> = Vec::new();
    for request in requests {
        match batches.iter_mut().find(|(font, _)| Arc::ptr_eq(font, &request.font)) {
            Some((_, batch)) => batch.push(request),
            None => batches.push((Arc::clone(&request.font), vec![request])),
        }
    }
    batches
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::assets::{MsdfAtlasInfo, MsdfMetrics};
    use crate::text::glyph_mesh::MAX_GLYPHS_PER_MESH;
    use crate::text::{GlyphBounds, GlyphRecord};
    use crate::text::test_fonts::square_font_named;
    use crate::text::DrawString;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Begin { font: String, view_projection: Mat4, texture_size: Vec2, px_range: f32 },
        Draw { technique: TextTechnique, color: Vec4, vertices: usize, vertex_ptr: usize },
        End(String),
    }

    #[derive(Default)]
    struct RecordingBackend {
        events: Vec<Event>,
        fail_draws: bool,
    }

    impl TextRenderBackend for RecordingBackend {
        fn begin_font(&mut self, pass: &FontPass<'_>) -> Result<(), RenderError> {
            self.events.push(Event::Begin {
                font: pass.font.name().to_string(),
                view_projection: pass.view_projection,
                texture_size: pass.texture_size,
                px_range: pass.px_range,
            });
            Ok(())
        }

        fn draw(&mut self, call: &TextDrawCall<'_>) -> Result<(), RenderError> {
            if self.fail_draws {
                return Err(RenderError("device lost".to_string()));
            }
            self.events.push(Event::Draw {
                technique: call.technique,
                color: call.color,
                vertices: call.buffers.vertices().len(),
                vertex_ptr: call.buffers.vertices().as_ptr() as usize,
            });
            Ok(())
        }

        fn end_font(&mut self, font: &FontAtlas) -> Result<(), RenderError> {
            self.events.push(Event::End(font.name().to_string()));
            Ok(())
        }
    }

    fn fonts() -> (Arc<FontAtlas>, Arc<FontAtlas>) {
        (Arc::new(square_font_named("Serif")), Arc::new(square_font_named("Mono")))
    }

    fn summary(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .map(|event| match event {
                Event::Begin { font, .. } => format!("begin {font}"),
                Event::Draw { vertices, .. } => format!("draw {vertices}"),
                Event::End(font) => format!("end {font}"),
            })
            .collect()
    }

    #[test]
    fn test_groups_by_font_in_first_seen_order() {
        let (serif, mono) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(Arc::clone(&serif), DrawRecipe::new("A"));
        renderer.enqueue(Arc::clone(&mono), DrawRecipe::new("AB"));
        renderer.enqueue(Arc::clone(&serif), DrawRecipe::new("ABA"));

        let mut backend = RecordingBackend::default();
        let draws = renderer.render_all(&mut backend, &Mat4::identity()).unwrap();

        assert_eq!(draws, 3);
        assert_eq!(
            summary(&backend.events),
            vec!["begin Serif", "draw 4", "draw 12", "end Serif", "begin Mono", "draw 8", "end Mono"]
        );
        assert!(renderer.pending().is_empty());
    }

    #[test]
    fn test_font_pass_parameters() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(serif, DrawRecipe::new("A"));

        let mut backend = RecordingBackend::default();
        renderer.render_all(&mut backend, &Mat4::identity()).unwrap();

        match &backend.events[0] {
            Event::Begin { view_projection, texture_size, px_range, .. } => {
                assert_eq!(*view_projection, Mat4::new_nonuniform_scaling(&Vec3::new(1.0, -1.0, 1.0)));
                assert_eq!(*texture_size, Vec2::new(32.0, 16.0));
                assert_eq!(*px_range, 4.0);
            }
            other => panic!("expected begin, got {other:?}"),
        }
    }

    #[test]
    fn test_flip_can_be_disabled() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default().with_flip_y(false));
        renderer.enqueue(serif, DrawRecipe::new("A"));

        let view = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let mut backend = RecordingBackend::default();
        renderer.render_all(&mut backend, &view).unwrap();
        assert!(matches!(&backend.events[0], Event::Begin { view_projection, .. } if *view_projection == view));
    }

    #[test]
    fn test_technique_follows_threshold() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        for size in [64.0, 33.0, 32.0, 12.0] {
            renderer.enqueue(Arc::clone(&serif), DrawRecipe::new("A").with_pixel_size(size));
        }

        let mut backend = RecordingBackend::default();
        renderer.render_all(&mut backend, &Mat4::identity()).unwrap();

        let techniques: Vec<TextTechnique> = backend
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Draw { technique, .. } => Some(*technique),
                _ => None,
            })
            .collect();
        assert_eq!(
            techniques,
            vec![
                TextTechnique::LargeText,
                TextTechnique::LargeText,
                TextTechnique::SmallText,
                TextTechnique::SmallText
            ]
        );
        assert_eq!(TextTechnique::LargeText.name(), "LargeText");
    }

    #[test]
    fn test_empty_and_blank_text_are_skipped() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(Arc::clone(&serif), DrawRecipe::new(""));
        renderer.enqueue(Arc::clone(&serif), DrawRecipe::new("   "));
        renderer.enqueue(serif, DrawRecipe::new("B").with_color(Vec4::new(0.0, 0.0, 1.0, 1.0)));

        let mut backend = RecordingBackend::default();
        assert_eq!(renderer.render_all(&mut backend, &Mat4::identity()).unwrap(), 1);
        assert!(backend.events.iter().any(
            |event| matches!(event, Event::Draw { color, .. } if *color == Vec4::new(0.0, 0.0, 1.0, 1.0))
        ));
    }

    #[test]
    fn test_prebuilt_mesh_is_drawn_without_rebuild() {
        let (serif, _) = fonts();
        let text = DrawString::new(Arc::clone(&serif), "AB").unwrap();
        let mut renderer = TextRenderer::new(TextConfig::default());
        text.enqueue(&mut renderer);

        let mut backend = RecordingBackend::default();
        renderer.render_all(&mut backend, &Mat4::identity()).unwrap();

        let expected = text.buffers().vertices().as_ptr() as usize;
        assert!(backend
            .events
            .iter()
            .any(|event| matches!(event, Event::Draw { vertex_ptr, .. } if *vertex_ptr == expected)));
        assert_eq!(text.mesh().build_count(), 1);
    }

    #[test]
    fn test_flush_discards_queue() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(serif, DrawRecipe::new("A"));
        assert_eq!(renderer.pending().len(), 1);

        renderer.flush();
        let mut backend = RecordingBackend::default();
        assert_eq!(renderer.render_all(&mut backend, &Mat4::identity()).unwrap(), 0);
        assert!(backend.events.is_empty());
    }

    #[test]
    fn test_backend_error_still_drains_queue() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(serif, DrawRecipe::new("A"));

        let mut backend = RecordingBackend {
            fail_draws: true,
            ..RecordingBackend::default()
        };
        let result = renderer.render_all(&mut backend, &Mat4::identity());
        assert!(matches!(result, Err(TextError::Render(RenderError(ref msg))) if msg == "device lost"));
        assert!(renderer.pending().is_empty());
    }

    #[test]
    fn test_failed_draw_still_closes_font_pass() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(serif, DrawRecipe::new("A"));

        let mut backend = RecordingBackend {
            fail_draws: true,
            ..RecordingBackend::default()
        };
        assert!(renderer.render_all(&mut backend, &Mat4::identity()).is_err());
        assert_eq!(summary(&backend.events), vec!["begin Serif", "end Serif"]);
    }

    #[test]
    fn test_oversized_request_is_mesh_error() {
        let (serif, _) = fonts();
        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(serif, DrawRecipe::new("A".repeat(MAX_GLYPHS_PER_MESH + 1)));

        let mut backend = RecordingBackend::default();
        let result = renderer.render_all(&mut backend, &Mat4::identity());
        assert!(matches!(result, Err(TextError::Mesh(MeshError::IndexOverflow { .. }))));
        assert_eq!(summary(&backend.events), vec!["begin Serif", "end Serif"]);
    }

    #[test]
    fn test_same_named_fonts_do_not_share_scratch_geometry() {
        let wide = Arc::new(square_font_named("Roboto"));
        let narrow_glyphs = HashMap::from([(
            'A',
            GlyphRecord::new(0.5)
                .with_plane_bounds(GlyphBounds::new(0.0, 0.0, 0.5, 1.0))
                .with_atlas_bounds(GlyphBounds::new(0.0, 0.0, 8.0, 16.0)),
        )]);
        let narrow = Arc::new(FontAtlas::new(
            "Roboto",
            MsdfAtlasInfo::new(32, 16, 4.0, 16.0),
            MsdfMetrics::with_line_height(1.0),
            narrow_glyphs,
            None,
        ));

        let mut renderer = TextRenderer::new(TextConfig::default());
        renderer.enqueue(wide, DrawRecipe::new("A"));
        renderer.enqueue(narrow, DrawRecipe::new("A"));

        let mut backend = WidthBackend::default();
        renderer.render_all(&mut backend, &Mat4::identity()).unwrap();
        assert_eq!(backend.widths, vec![64.0, 32.0]);
    }

    /// Records the width of the first quad of every draw
    #[derive(Default)]
    struct WidthBackend {
        widths: Vec<f32>,
    }

    impl TextRenderBackend for WidthBackend {
        fn begin_font(&mut self, _pass: &FontPass<'_>) -> Result<(), RenderError> {
            Ok(())
        }

        fn draw(&mut self, call: &TextDrawCall<'_>) -> Result<(), RenderError> {
            let quad = call.buffers.vertices();
            self.widths.push(quad[1].position[0] - quad[0].position[0]);
            Ok(())
        }

        fn end_font(&mut self, _font: &FontAtlas) -> Result<(), RenderError> {
            Ok(())
        }
    }

    #[test]
    fn test_recipe_uses_configured_pixel_size() {
        let renderer = TextRenderer::new(TextConfig::default().with_default_pixel_size(24.0));
        assert_eq!(renderer.recipe("hi").pixel_size, 24.0);
    }
}
