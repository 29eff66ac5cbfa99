//! Template images and the per-run template cache

use image::{DynamicImage, GrayImage, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{BotError, BotResult};

/// A reference image decoded once, held in both color and grayscale form.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    name: String,
    color: RgbImage,
    gray: GrayImage,
}

impl Template {
    pub fn load(path: impl AsRef<Path>) -> BotResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BotError::TemplateNotFound {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }

        let image = image::open(path).map_err(|e| BotError::TemplateNotFound {
            path: path.to_path_buf(),
            reason: format!("failed to decode: {e}"),
        })?;

        Self::from_image(path, image)
    }

    /// Wraps an already decoded image. `path` is only used for naming and
    /// error reporting.
    pub fn from_image(path: impl AsRef<Path>, image: DynamicImage) -> BotResult<Self> {
        let path = path.as_ref().to_path_buf();
        if image.width() == 0 || image.height() == 0 {
            return Err(BotError::TemplateNotFound {
                path,
                reason: "template image is empty".to_string(),
            });
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        log::debug!(
            "📄 Loaded template '{}' ({}x{})",
            name,
            image.width(),
            image.height()
        );

        Ok(Self {
            color: image.to_rgb8(),
            gray: image.to_luma8(),
            path,
            name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    pub fn color(&self) -> &RgbImage {
        &self.color
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }
}

/// Caches decoded templates by path for the lifetime of a run.
#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: HashMap<PathBuf, Arc<Template>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached template, decoding it on first use.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> BotResult<Arc<Template>> {
        let path = path.as_ref();
        if let Some(template) = self.templates.get(path) {
            return Ok(Arc::clone(template));
        }

        let template = Arc::new(Template::load(path)?);
        self.templates
            .insert(path.to_path_buf(), Arc::clone(&template));
        Ok(template)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
