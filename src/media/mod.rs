//! Media sessions: one decoded still image or one open video at a time.

pub mod still;
pub mod video;

pub use still::StillImage;
pub use video::{FfmpegSource, Frame, FrameSource, VideoInfo};
