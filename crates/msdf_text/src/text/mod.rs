//! MSDF text: font atlases, measurement, glyph meshes and the draw queue
//!
//! Typical flow: load a [`FontAtlas`] through a [`FontRegistry`], wrap text in
//! a [`DrawString`] (or build a [`DrawRecipe`] by hand), queue it on a
//! [`TextRenderer`] and call [`TextRenderer::render_all`] once per frame.

pub mod draw_string;
pub mod font_atlas;
pub mod font_registry;
pub mod glyph_mesh;
pub mod layout;
pub mod measure;
pub mod text_renderer;

#[cfg(test)]
pub(crate) mod test_fonts;

pub use draw_string::DrawString;
pub use font_atlas::{FontAtlas, FontError, FontResult, GlyphBounds, GlyphRecord, DEFAULT_WHITESPACE_ADVANCE};
pub use font_registry::{DirectoryFontSource, FontRegistry, FontSource};
pub use glyph_mesh::{
    visible_glyph_count, GlyphMesh, MeshBuffers, MeshError, MeshState, TextVertex, MAX_GLYPHS_PER_MESH,
};
pub use layout::{DrawRecipe, HAlignment, LayoutKey, VAlignment, DEFAULT_PIXEL_SIZE};
pub use measure::measure_string;
pub use text_renderer::{
    DrawRequest, FontPass, RenderError, TextDrawCall, TextError, TextRenderBackend, TextRenderer, TextTechnique,
};
