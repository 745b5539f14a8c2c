//! # MSDF Text
//!
//! Layout and mesh building for multi-channel signed distance field fonts.
//!
//! ## Features
//!
//! - **Atlas loading**: msdf-atlas-gen JSON schema plus PNG texture
//! - **Measurement**: bounding boxes of multi-line strings in ems
//! - **Glyph meshes**: one quad per visible glyph, rebuilt only when the layout changes
//! - **Draw queue**: per-frame requests flushed to a pluggable render backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use msdf_text::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TextConfig::default();
//!     let fonts = FontRegistry::from_config(&config);
//!     let font = fonts.load("Roboto")?;
//!
//!     let mut score = DrawString::new(font, "Score: 0")?;
//!     score.set_position(Vec3::new(0.0, 200.0, 0.0));
//!
//!     let mut renderer = TextRenderer::new(config);
//!     score.enqueue(&mut renderer);
//!     assert_eq!(renderer.pending().len(), 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod text;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, TextConfig},
        foundation::math::{Mat4, Quat, Rect, Vec2, Vec3, Vec4},
        text::{
            measure_string, DrawRecipe, DrawString, FontAtlas, FontError, FontRegistry, GlyphMesh, HAlignment,
            MeshError, TextError, TextRenderBackend, TextRenderer, VAlignment,
        },
    };
}
