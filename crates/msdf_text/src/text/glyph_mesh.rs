//! Glyph mesh building and caching
//!
//! Turns a [`DrawRecipe`] into an indexed triangle list with one quad per
//! visible glyph. The mesh remembers the [`LayoutKey`] it was built from and
//! skips the build entirely when asked to rebuild an unchanged layout, which
//! is the common case for text drawn every frame.
//!
//! # Layout coordinate system
//!
//! - Quads are placed at `pen + plane_bounds * pixel_size`, with the plane
//!   bounds' `top` and `bottom` used as-is (no axis flip here; the renderer
//!   flips Y in the view matrix)
//! - Each line moves the pen by `+line_spacing * line_height * pixel_size` on Y
//! - Alignment 0 puts the bounding box's left/top edge at the origin, 0.5
//!   centers it and 1 puts the right/bottom edge at the origin
//!
//! # Winding
//!
//! Quad corners are emitted top-left, top-right, bottom-left, bottom-right and
//! indexed as `(0, 1, 2)` and `(3, 2, 1)`. Both triangles share the 1-2
//! diagonal and have the same orientation.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use super::layout::{DrawRecipe, LayoutKey};
use super::measure::measure_string;
use super::{FontAtlas, GlyphBounds, GlyphRecord};
use crate::foundation::math::Vec2;

/// Most glyphs one mesh can hold: every vertex index must fit in a `u16`
pub const MAX_GLYPHS_PER_MESH: usize = (u16::MAX as usize + 1) / VERTICES_PER_GLYPH;

/// Vertices emitted per visible glyph
pub const VERTICES_PER_GLYPH: usize = 4;

/// Indices emitted per visible glyph
pub const INDICES_PER_GLYPH: usize = 6;

/// Vertex data for text rendering
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct TextVertex {
    /// Position in model space (pixels)
    pub position: [f32; 3],
    /// Atlas coordinates in atlas pixels
    pub uv: [f32; 2],
}

impl TextVertex {
    fn new(position: Vec2, u: f32, v: f32) -> Self {
        Self {
            position: [position.x, position.y, 0.0],
            uv: [u, v],
        }
    }
}

/// Errors from building text geometry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// The text has more visible glyphs than 16-bit indices can address
    #[error("Text has {glyphs} visible glyphs but a mesh holds at most {max}")]
    IndexOverflow {
        /// Visible glyphs in the rejected text
        glyphs: usize,
        /// Largest supported glyph count
        max: usize,
    },
}

/// Lifecycle of a [`GlyphMesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshState {
    /// No buffers allocated yet
    Empty,
    /// Buffers sized for a glyph count but not filled
    Sized,
    /// Buffers hold geometry for the cached layout
    Built,
}

/// Shared snapshot of a mesh's vertex and index buffers
///
/// Cloning is cheap. A snapshot never changes: a later rebuild of the mesh
/// that produced it writes to a fresh copy instead.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    vertices: Arc<Vec<TextVertex>>,
    indices: Arc<Vec<u16>>,
}

impl MeshBuffers {
    /// Vertex buffer, four vertices per glyph
    pub fn vertices(&self) -> &[TextVertex] {
        &self.vertices
    }

    /// Index buffer, six indices per glyph
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of triangles in the index buffer
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True when both snapshots share the same storage
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.vertices, &other.vertices) && Arc::ptr_eq(&self.indices, &other.indices)
    }
}

/// Plane bounds of a glyph that gets a quad, `None` for pen-only characters
fn quad_bounds(ch: char, glyph: &GlyphRecord) -> Option<&GlyphBounds> {
    if ch.is_whitespace() {
        return None;
    }
    glyph.plane_bounds.as_ref()
}

/// Number of quads `text` produces with `atlas`
///
/// Whitespace (including `\n`), characters missing from the atlas and glyphs
/// without plane bounds produce none.
pub fn visible_glyph_count(text: &str, atlas: &FontAtlas) -> usize {
    text.chars()
        .filter(|&ch| atlas.glyph(ch).and_then(|glyph| quad_bounds(ch, glyph)).is_some())
        .count()
}

fn check_capacity(glyphs: usize) -> Result<(), MeshError> {
    if glyphs > MAX_GLYPHS_PER_MESH {
        return Err(MeshError::IndexOverflow {
            glyphs,
            max: MAX_GLYPHS_PER_MESH,
        });
    }
    Ok(())
}

/// Cached quad geometry for one string
#[derive(Debug)]
pub struct GlyphMesh {
    buffers: MeshBuffers,
    key: Option<LayoutKey>,
    visible_count: usize,
    state: MeshState,
    build_count: u64,
}

impl Default for GlyphMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphMesh {
    /// Create a mesh with no buffers
    pub fn new() -> Self {
        Self {
            buffers: MeshBuffers::default(),
            key: None,
            visible_count: 0,
            state: MeshState::Empty,
            build_count: 0,
        }
    }

    /// Create a mesh with buffers sized for `glyphs` quads
    pub fn with_capacity(glyphs: usize) -> Result<Self, MeshError> {
        check_capacity(glyphs)?;
        let mut mesh = Self::new();
        mesh.allocate(glyphs);
        Ok(mesh)
    }

    /// Bring the geometry up to date with `recipe`
    ///
    /// Returns `Ok(true)` when geometry was rebuilt and `Ok(false)` on a cache
    /// hit. On error the previous geometry is left untouched.
    pub fn rebuild(&mut self, recipe: &DrawRecipe, atlas: &FontAtlas) -> Result<bool, MeshError> {
        let visible = visible_glyph_count(&recipe.text, atlas);
        check_capacity(visible)?;

        let key = recipe.layout_key(atlas);
        let mut must_build = self.key.as_ref() != Some(&key);

        if self.state == MeshState::Empty || visible != self.visible_count {
            self.allocate(visible);
            must_build = true;
        }

        if !must_build {
            return Ok(false);
        }

        self.build(recipe, atlas);
        self.key = Some(key);
        self.state = MeshState::Built;
        self.build_count += 1;

        log::debug!(
            "Built text mesh for {:?} ({} glyphs, font '{}')",
            recipe.text,
            visible,
            atlas.name()
        );
        Ok(true)
    }

    fn allocate(&mut self, glyphs: usize) {
        log::debug!("Allocating text mesh for {} glyphs (was {})", glyphs, self.visible_count);

        self.buffers = MeshBuffers {
            vertices: Arc::new(vec![TextVertex::default(); glyphs * VERTICES_PER_GLYPH]),
            indices: Arc::new(vec![0; glyphs * INDICES_PER_GLYPH]),
        };
        self.visible_count = glyphs;
        self.key = None;
        self.state = MeshState::Sized;
    }

    // Buffers are already sized for exactly the quads this walk emits.
    #[allow(clippy::cast_possible_truncation)]
    fn build(&mut self, recipe: &DrawRecipe, atlas: &FontAtlas) {
        let px = recipe.pixel_size;
        let bounds = measure_string(&recipe.text, recipe.line_spacing, recipe.character_spacing, atlas);

        let offset = Vec2::new(
            -bounds.x - bounds.width * recipe.horizontal_align,
            -bounds.y - bounds.height * recipe.vertical_align,
        ) * px;

        let direction = if recipe.right_to_left { -1.0 } else { 1.0 };
        let line_advance = recipe.line_spacing * atlas.line_height() * px;

        let vertices = Arc::make_mut(&mut self.buffers.vertices);
        let indices = Arc::make_mut(&mut self.buffers.indices);

        let mut shift = offset;
        let mut quad = 0usize;

        for ch in recipe.text.chars() {
            if ch == '\n' {
                shift.y += line_advance;
                shift.x = offset.x;
                continue;
            }

            let Some(glyph) = atlas.glyph(ch) else {
                log::trace!("No glyph for {:?} in '{}', skipping", ch, atlas.name());
                continue;
            };

            if let Some(plane) = quad_bounds(ch, glyph) {
                let v1 = shift + plane.top_left() * px;
                let v2 = shift + plane.bottom_right() * px;
                let uv = glyph.atlas_bounds.unwrap_or(GlyphBounds::new(0.0, 0.0, 0.0, 0.0));

                let base = quad * VERTICES_PER_GLYPH;
                vertices[base..base + VERTICES_PER_GLYPH].copy_from_slice(&[
                    TextVertex::new(v1, uv.left, uv.top),
                    TextVertex::new(Vec2::new(v2.x, v1.y), uv.right, uv.top),
                    TextVertex::new(Vec2::new(v1.x, v2.y), uv.left, uv.bottom),
                    TextVertex::new(v2, uv.right, uv.bottom),
                ]);

                let first = base as u16;
                let start = quad * INDICES_PER_GLYPH;
                indices[start..start + INDICES_PER_GLYPH].copy_from_slice(&[
                    first,
                    first + 1,
                    first + 2,
                    first + 3,
                    first + 2,
                    first + 1,
                ]);

                quad += 1;
            }

            shift.x += glyph.advance * px * direction * recipe.character_spacing;
        }

        debug_assert_eq!(quad, self.visible_count);
    }

    /// Current lifecycle state
    pub fn state(&self) -> MeshState {
        self.state
    }

    /// Number of quads the buffers hold
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// How many times geometry has been (re)built
    pub fn build_count(&self) -> u64 {
        self.build_count
    }

    /// Cheap snapshot of the current buffers
    pub fn buffers(&self) -> MeshBuffers {
        self.buffers.clone()
    }

    /// Current vertices
    pub fn vertices(&self) -> &[TextVertex] {
        self.buffers.vertices()
    }

    /// Current indices
    pub fn indices(&self) -> &[u16] {
        self.buffers.indices()
    }
}
