use std::collections::HashMap;
use std::path::{Path, PathBuf};

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

use crate::tools::ToolId;

/// Errors that can occur while producing texture pixels
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid texture dimensions")]
    InvalidDimensions,
}

/// What a cached texture shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextureKey {
    /// The visible slice of the drawing surface.
    Canvas,
    /// A tool's custom cursor bitmap.
    Cursor(ToolId),
}

/// Caches GPU textures keyed by what they show, re-uploading only when the
/// caller's version stamp changes.
pub struct TextureManager {
    /// Cached handle and the version it was generated for
    texture_cache: HashMap<TextureKey, (u64, TextureHandle)>,
    /// Tracks when each texture was last used
    last_used: HashMap<TextureKey, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Returns the texture for `key`, regenerating it when `version` differs
    /// from the cached one. An existing handle is updated in place.
    pub fn get_or_update<F>(
        &mut self,
        key: TextureKey,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureError>
    where
        F: FnOnce() -> Result<ColorImage, TextureError>,
    {
        self.last_used.insert(key.clone(), self.current_frame);

        if let Some((cached_version, handle)) = self.texture_cache.get_mut(&key) {
            if *cached_version != version {
                let image = generator()?;
                handle.set(image, TextureOptions::NEAREST);
                *cached_version = version;
            }
            return Ok(handle.id());
        }

        let image = generator()?;
        if image.size[0] == 0 || image.size[1] == 0 {
            return Err(TextureError::InvalidDimensions);
        }
        let handle = ctx.load_texture(format!("{key:?}"), image, TextureOptions::NEAREST);
        let id = handle.id();
        self.texture_cache.insert(key, (version, handle));
        self.prune_cache_if_needed();
        Ok(id)
    }

    /// Pixel size of a cached texture.
    pub fn size(&self, key: &TextureKey) -> Option<[usize; 2]> {
        self.texture_cache.get(key).map(|(_, handle)| handle.size())
    }

    pub fn invalidate(&mut self, key: &TextureKey) {
        self.texture_cache.remove(key);
        self.last_used.remove(key);
    }

    /// Prunes the least recently used textures once over the limit
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(TextureKey, u64)> = self
            .last_used
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = self.texture_cache.len() - self.max_cache_size;
        for (key, _) in entries.into_iter().take(to_remove) {
            self.invalidate(&key);
        }
    }

    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }
}

/// Decode an image file into egui pixels.
pub fn decode_image(path: &Path) -> Result<ColorImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    if size[0] == 0 || size[1] == 0 {
        return Err(TextureError::InvalidDimensions);
    }
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// One-off texture for an icon file.
pub fn load_texture_from_path(ctx: &Context, path: &Path) -> Result<TextureHandle, TextureError> {
    let image = decode_image(path)?;
    log::info!("Loaded icon {} ({}x{})", path.display(), image.size[0], image.size[1]);
    Ok(ctx.load_texture(path.display().to_string(), image, TextureOptions::LINEAR))
}
