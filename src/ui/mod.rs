//! eframe front-ends. These only translate egui input into library calls and paint the result.

mod canvas;
mod image_tool;
mod video_tool;

use std::path::PathBuf;

use crate::config::Settings;

pub use image_tool::ImageToolApp;
pub use video_tool::VideoToolApp;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "m4v", "mpg", "wmv"];

fn native_options(settings: &Settings, title: &str, extra_height: f32) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                settings.display.max_width as f32 + 16.0,
                settings.display.max_height as f32 + extra_height,
            ])
            .with_title(title),
        ..Default::default()
    }
}

pub fn run_image_tool(settings: Settings, initial: Option<PathBuf>) -> eframe::Result<()> {
    let title = "Exclusion rectangle (image)";
    let options = native_options(&settings, title, 64.0);
    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(ImageToolApp::new(settings, initial)))),
    )
}

pub fn run_video_tool(settings: Settings, initial: Option<PathBuf>) -> eframe::Result<()> {
    let title = "Exclusion rectangle (video)";
    let options = native_options(&settings, title, 96.0);
    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(VideoToolApp::new(settings, initial)))),
    )
}
