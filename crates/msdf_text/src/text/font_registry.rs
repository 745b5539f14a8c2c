//! Font registry
//!
//! Maps font names to loaded atlases. Loading is idempotent: the first
//! `load` of a name reads its files, later calls hand back the same
//! `Arc<FontAtlas>` without touching the file system.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::font_atlas::{FontAtlas, FontError, FontResult};
use crate::config::TextConfig;

/// Something that can produce a font atlas from a font name
pub trait FontSource {
    /// Load the atlas registered as `name`
    fn load_atlas(&self, name: &str) -> FontResult<FontAtlas>;
}

/// Loads `<folder>/<name>.png` and `<folder>/<name>.json` pairs
#[derive(Debug, Clone)]
pub struct DirectoryFontSource {
    folder: PathBuf,
    load_textures: bool,
}

impl DirectoryFontSource {
    /// Source reading fonts (schema and texture) from `folder`
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            load_textures: true,
        }
    }

    /// Source that requires the texture to exist but does not decode it
    ///
    /// Useful for headless tools that only need layout.
    pub fn without_texture(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            load_textures: false,
        }
    }

    /// Folder fonts are read from
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Path of the atlas texture for `name`
    pub fn texture_path(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{name}.png"))
    }

    /// Path of the atlas schema for `name`
    pub fn schema_path(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{name}.json"))
    }
}

impl FontSource for DirectoryFontSource {
    fn load_atlas(&self, name: &str) -> FontResult<FontAtlas> {
        let texture_path = self.texture_path(name);
        let schema_path = self.schema_path(name);

        // Both files must be present before anything is parsed
        if !texture_path.is_file() {
            return Err(FontError::AssetNotFound(texture_path));
        }
        if !schema_path.is_file() {
            return Err(FontError::AssetNotFound(schema_path));
        }

        let texture = self.load_textures.then_some(texture_path.as_path());
        FontAtlas::from_files(name, &schema_path, texture)
    }
}

/// Name-keyed cache of loaded fonts
///
/// Owned by the application and passed to whatever needs font lookup.
/// Reads take a shared lock; a first load takes the write lock for the whole
/// load so concurrent first loads of one name read its files once.
pub struct FontRegistry<S = DirectoryFontSource> {
    source: S,
    fonts: RwLock<HashMap<String, Arc<FontAtlas>>>,
}

impl FontRegistry<DirectoryFontSource> {
    /// Registry reading fonts from the configured font directory
    pub fn from_config(config: &TextConfig) -> Self {
        Self::new(DirectoryFontSource::new(&config.font_directory))
    }
}

impl<S: FontSource> FontRegistry<S> {
    /// Create an empty registry over `source`
    pub fn new(source: S) -> Self {
        Self {
            source,
            fonts: RwLock::new(HashMap::new()),
        }
    }

    /// Load a font, or return the already loaded instance
    pub fn load(&self, name: &str) -> FontResult<Arc<FontAtlas>> {
        if let Some(font) = self.get(name) {
            log::debug!("Font '{}' already loaded", name);
            return Ok(font);
        }

        // Entries are immutable once inserted, so a poisoned lock still holds valid data
        let mut fonts = self.fonts.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(font) = fonts.get(name) {
            return Ok(Arc::clone(font));
        }

        let atlas = Arc::new(self.source.load_atlas(name)?);
        log::info!(
            "Loaded font '{}': {} glyphs, distance range {}px, atlas {}x{}",
            name,
            atlas.glyph_count(),
            atlas.distance_range(),
            atlas.atlas_info().width,
            atlas.atlas_info().height,
        );

        fonts.insert(name.to_string(), Arc::clone(&atlas));
        Ok(atlas)
    }

    /// Get a loaded font without loading it
    pub fn get(&self, name: &str) -> Option<Arc<FontAtlas>> {
        let fonts = self.fonts.read().unwrap_or_else(PoisonError::into_inner);
        fonts.get(name).map(Arc::clone)
    }

    /// True when `name` has been loaded
    pub fn contains(&self, name: &str) -> bool {
        let fonts = self.fonts.read().unwrap_or_else(PoisonError::into_inner);
        fonts.contains_key(name)
    }

    /// Number of loaded fonts
    pub fn len(&self) -> usize {
        let fonts = self.fonts.read().unwrap_or_else(PoisonError::into_inner);
        fonts.len()
    }

    /// True when no font has been loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all loaded fonts, sorted
    pub fn font_names(&self) -> Vec<String> {
        let fonts = self.fonts.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = fonts.keys().cloned().collect();
        names.sort();
        names
    }

    /// The source fonts are loaded from
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::test_fonts::write_font_files;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory source that counts how often it is asked to read files
    struct CountingSource {
        inner: DirectoryFontSource,
        reads: AtomicUsize,
    }

    impl CountingSource {
        fn new(folder: &Path) -> Self {
            Self {
                inner: DirectoryFontSource::new(folder),
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl FontSource for CountingSource {
        fn load_atlas(&self, name: &str) -> FontResult<FontAtlas> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_atlas(name)
        }
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_font_files(dir.path(), "Roboto");

        let registry = FontRegistry::new(CountingSource::new(dir.path()));
        let first = registry.load("Roboto").unwrap();
        let second = registry.load("Roboto").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.source().reads(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Roboto"));
        assert!(Arc::ptr_eq(&registry.get("Roboto").unwrap(), &first));
    }

    #[test]
    fn test_loaded_font_has_texture() {
        let dir = tempfile::tempdir().unwrap();
        write_font_files(dir.path(), "Roboto");

        let registry = FontRegistry::new(DirectoryFontSource::new(dir.path()));
        let font = registry.load("Roboto").unwrap();
        assert_eq!(font.name(), "Roboto");
        assert_eq!(font.texture().map(|t| t.dimensions()), Some((128, 64)));

        let headless = FontRegistry::new(DirectoryFontSource::without_texture(dir.path()));
        assert!(headless.load("Roboto").unwrap().texture().is_none());
    }

    #[test]
    fn test_missing_texture_is_asset_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_font_files(dir.path(), "Roboto");
        std::fs::remove_file(dir.path().join("Roboto.png")).unwrap();

        let registry = FontRegistry::new(DirectoryFontSource::new(dir.path()));
        match registry.load("Roboto") {
            Err(FontError::AssetNotFound(path)) => assert!(path.ends_with("Roboto.png")),
            other => panic!("expected AssetNotFound, got {other:?}"),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_schema_is_asset_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_font_files(dir.path(), "Roboto");
        std::fs::remove_file(dir.path().join("Roboto.json")).unwrap();

        let registry = FontRegistry::new(DirectoryFontSource::new(dir.path()));
        match registry.load("Roboto") {
            Err(FontError::AssetNotFound(path)) => assert!(path.ends_with("Roboto.json")),
            other => panic!("expected AssetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_schema_is_parse_error_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        write_font_files(dir.path(), "Roboto");
        std::fs::write(dir.path().join("Roboto.json"), r#"{"atlas": {}}"#).unwrap();

        let registry = FontRegistry::new(CountingSource::new(dir.path()));
        assert!(matches!(registry.load("Roboto"), Err(FontError::SchemaParse { .. })));
        assert!(!registry.contains("Roboto"));

        // A fixed file loads on the next attempt
        write_font_files(dir.path(), "Roboto");
        assert!(registry.load("Roboto").is_ok());
        assert_eq!(registry.source().reads(), 2);
    }

    #[test]
    fn test_concurrent_first_loads_read_once() {
        let dir = tempfile::tempdir().unwrap();
        write_font_files(dir.path(), "Roboto");
        let registry = FontRegistry::new(CountingSource::new(dir.path()));

        let fonts: Vec<Arc<FontAtlas>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.load("Roboto").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registry.source().reads(), 1);
        assert!(fonts.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn test_font_names_and_config() {
        let dir = tempfile::tempdir().unwrap();
        write_font_files(dir.path(), "Beta");
        write_font_files(dir.path(), "Alpha");

        let config = TextConfig::new(dir.path().to_string_lossy());
        let registry = FontRegistry::from_config(&config);
        registry.load("Beta").unwrap();
        registry.load("Alpha").unwrap();
        assert_eq!(registry.font_names(), vec!["Alpha".to_string(), "Beta".to_string()]);
        assert_eq!(registry.source().folder(), dir.path());
    }
}
