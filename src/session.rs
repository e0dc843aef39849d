//! State of the image tool: the loaded picture and the rectangle drawn on it.

use std::path::Path;

use log::info;

use crate::config::Settings;
use crate::deface::DefaceInvocation;
use crate::error::{Error, Result};
use crate::geometry::OriginalRect;
use crate::media::StillImage;
use crate::output;
use crate::selector::{PointerEvent, RectSelector};

pub struct ImageSession {
    settings: Settings,
    image: Option<StillImage>,
    selector: RectSelector,
}

impl ImageSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            image: None,
            selector: RectSelector::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn image(&self) -> Option<&StillImage> {
        self.image.as_ref()
    }

    pub fn selector(&self) -> &RectSelector {
        &self.selector
    }

    /// Replaces the current image. On failure the previous state is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<&StillImage> {
        let image = StillImage::open(path, self.settings.display)?;
        info!("loaded {}", path.display());
        self.selector.clear();
        Ok(&*self.image.insert(image))
    }

    /// Forget image, rectangle and scale.
    pub fn restart(&mut self) {
        self.image = None;
        self.selector.clear();
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        if self.image.is_some() {
            self.selector.handle(event);
        }
    }

    /// Finalized rectangle in original pixels, read back against the rendered canvas size.
    ///
    /// Without an image there is no rectangle either, so that case is [`Error::NoSelection`].
    pub fn coordinates(&self, rendered: (f32, f32)) -> Result<OriginalRect> {
        let corners = self.selector.finalized().ok_or(Error::NoSelection)?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no image loaded".into()))?;
        let scale = image.scale_for_rendered(rendered)?;
        Ok(output::reported(scale.to_original(corners), &self.settings))
    }

    pub fn invocation(&self, rendered: (f32, f32)) -> Result<DefaceInvocation> {
        let rect = self.coordinates(rendered)?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no image loaded".into()))?;
        Ok(DefaceInvocation::new(
            self.settings.deface.program.clone(),
            image.path(),
            rect,
        ))
    }
}
