//! Asset loading: atlas schema files and atlas textures

pub mod image_loader;
pub mod schema;

pub use image_loader::ImageData;
pub use schema::{MsdfAtlasInfo, MsdfBounds, MsdfGlyph, MsdfMetrics, MsdfSchema, YOrigin};

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
