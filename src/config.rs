//! Runtime settings shared by both tools.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::geometry::DisplayBox;

/// How coordinates are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaceSettings {
    pub program: PathBuf,
    /// Print the command line without running it.
    pub print_only: bool,
}

impl Default for DefaceSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("deface"),
            print_only: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderSettings {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub display: DisplayBox,
    /// Playback timer interval.
    pub tick: Duration,
    /// Report `(min_x, min_y, max_x, max_y)` instead of corners as drawn.
    pub normalize: bool,
    pub format: OutputFormat,
    pub deface: DefaceSettings,
    pub decoder: DecoderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display: DisplayBox::default(),
            tick: Duration::from_millis(20),
            normalize: false,
            format: OutputFormat::Text,
            deface: DefaceSettings::default(),
            decoder: DecoderSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(self) -> Result<Self> {
        if self.display.max_width == 0 || self.display.max_height == 0 {
            return Err(Error::Config(format!(
                "display box must be at least 1x1, got {}x{}",
                self.display.max_width, self.display.max_height
            )));
        }
        if self.tick.is_zero() {
            return Err(Error::Config("tick interval must be positive".into()));
        }
        if self.deface.program.as_os_str().is_empty() {
            return Err(Error::Config("deface program must not be empty".into()));
        }
        Ok(self)
    }
}
