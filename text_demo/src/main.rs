//! Headless text demo
//!
//! Loads one font, lays out a few strings and pushes three frames through a
//! backend that logs every call instead of touching a GPU.
//!
//! Usage: `text_demo [config.toml|config.ron] [font name]`

use std::sync::Arc;

use msdf_text::foundation::logging;
use msdf_text::prelude::*;
use msdf_text::text::{FontPass, RenderError, TextDrawCall};

const DEFAULT_CONFIG: &str = "text.toml";
const DEFAULT_FONT: &str = "Roboto";
const FRAMES: u32 = 3;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Text error: {0}")]
    Text(#[from] TextError),

    #[error("Layout error: {0}")]
    Mesh(#[from] MeshError),
}

/// Backend that logs what a GPU backend would be asked to do
#[derive(Default)]
struct LoggingBackend {
    frame_triangles: usize,
}

impl TextRenderBackend for LoggingBackend {
    fn begin_font(&mut self, pass: &FontPass<'_>) -> Result<(), RenderError> {
        log::info!(
            "bind font '{}' ({}x{} texture, px range {})",
            pass.font.name(),
            pass.texture_size.x,
            pass.texture_size.y,
            pass.px_range
        );
        Ok(())
    }

    fn draw(&mut self, call: &TextDrawCall<'_>) -> Result<(), RenderError> {
        log::info!(
            "  draw {} triangles with {} at ({:.1}, {:.1}), {} vertex bytes",
            call.buffers.triangle_count(),
            call.technique.name(),
            call.world_matrix.m14,
            call.world_matrix.m24,
            call.buffers.vertex_bytes().len()
        );
        self.frame_triangles += call.buffers.triangle_count();
        Ok(())
    }

    fn end_font(&mut self, font: &FontAtlas) -> Result<(), RenderError> {
        log::debug!("unbind font '{}'", font.name());
        Ok(())
    }
}

fn run(config_path: &str, font_name: &str) -> Result<(), DemoError> {
    let config = TextConfig::load_or_default(config_path)?;
    config.validate()?;
    log::info!("Fonts from '{}'", config.font_directory);

    let fonts = FontRegistry::from_config(&config);
    let font: Arc<FontAtlas> = fonts.load(font_name)?;

    let mut title = DrawString::new(Arc::clone(&font), "MSDF TEXT")?;
    title.set_pixel_size(96.0)?;
    title.set_position(Vec3::new(0.0, 240.0, 0.0));

    let mut score = DrawString::new(Arc::clone(&font), "Score: 0")?;
    score.set_alignment(HAlignment::Left, VAlignment::Top)?;
    score.set_pixel_size(24.0)?;
    score.set_position(Vec3::new(-620.0, 340.0, 0.0));
    score.set_color(Vec4::new(1.0, 0.85, 0.2, 1.0));

    let mut renderer = TextRenderer::new(config);
    let view = Mat4::new_orthographic(-640.0, 640.0, -360.0, 360.0, -1.0, 1.0);
    let mut backend = LoggingBackend::default();

    for frame in 0..FRAMES {
        // Only the score changes between frames; the title mesh stays cached
        let rebuilt = score.set_text(format!("Score: {}", frame * 150))?;
        title.set_angle(frame as f32 * 5.0);

        title.enqueue(&mut renderer);
        score.enqueue(&mut renderer);

        let footer = renderer
            .recipe("line one\nline two")
            .with_alignment_preset(HAlignment::Right, VAlignment::Bottom)
            .with_screen_transform(Vec2::new(620.0, -340.0), 1.0, 0.0, Vec2::new(1.0, 1.0));
        renderer.enqueue(Arc::clone(&font), footer);

        backend.frame_triangles = 0;
        let draws = renderer.render_all(&mut backend, &view)?;
        log::info!(
            "frame {}: {} draws, {} triangles, score rebuilt: {}",
            frame,
            draws,
            backend.frame_triangles,
            rebuilt
        );
    }

    log::info!(
        "title built {} time(s), score built {} time(s)",
        title.mesh().build_count(),
        score.mesh().build_count()
    );
    Ok(())
}

fn main() {
    logging::init_with_level("info");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let font_name = args.next().unwrap_or_else(|| DEFAULT_FONT.to_string());

    log::info!("Starting text demo");
    if let Err(err) = run(&config_path, &font_name) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
