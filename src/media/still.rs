use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbaImage;
use log::debug;

use crate::error::{Error, Result};
use crate::geometry::{DisplayBox, DisplayFit, ScaleFactor};

/// A still image decoded at native resolution and resized for display.
pub struct StillImage {
    path: PathBuf,
    original: (u32, u32),
    fit: DisplayFit,
    display: RgbaImage,
}

impl StillImage {
    pub fn open(path: &Path, display_box: DisplayBox) -> Result<Self> {
        let img = image::open(path).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let original = (img.width(), img.height());
        let fit = display_box.fit_aspect(original.0, original.1)?;
        debug!(
            "{}: {}x{} shown at {}x{}",
            path.display(),
            original.0,
            original.1,
            fit.width,
            fit.height
        );

        let display = img
            .resize_exact(fit.width, fit.height, FilterType::Lanczos3)
            .to_rgba8();

        Ok(Self {
            path: path.to_path_buf(),
            original,
            fit,
            display,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_size(&self) -> (u32, u32) {
        self.original
    }

    pub fn fit(&self) -> &DisplayFit {
        &self.fit
    }

    pub fn display_image(&self) -> &RgbaImage {
        &self.display
    }

    /// Scale factors derived from the size the canvas was actually painted at.
    pub fn scale_for_rendered(&self, rendered: (f32, f32)) -> Result<ScaleFactor> {
        ScaleFactor::from_rendered(self.original, rendered)
    }
}
