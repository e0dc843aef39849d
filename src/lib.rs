//! Interactive selection of an exclusion rectangle on a still image or a video frame,
//! reported in the media's native pixel coordinates and optionally handed to `deface`.

pub mod config;
pub mod deface;
pub mod error;
pub mod geometry;
pub mod media;
pub mod output;
pub mod scrubber;
pub mod selector;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
