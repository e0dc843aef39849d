use std::path::{Path, PathBuf};

use log::warn;

use super::canvas::{self, MediaTexture};
use super::IMAGE_EXTENSIONS;
use crate::config::Settings;
use crate::error::Error;
use crate::output;
use crate::session::ImageSession;

const TOOLBAR_HEIGHT: f32 = 64.0;

pub struct ImageToolApp {
    session: ImageSession,
    texture: MediaTexture,
    texture_stale: bool,
    /// Size the image was last painted at; coordinates are read back against it.
    rendered: Option<egui::Vec2>,
    pending: Option<PathBuf>,
    status: String,
}

impl ImageToolApp {
    pub fn new(settings: Settings, initial: Option<PathBuf>) -> Self {
        Self {
            session: ImageSession::new(settings),
            texture: MediaTexture::default(),
            texture_stale: false,
            rendered: None,
            pending: initial,
            status: String::new(),
        }
    }

    fn upload(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.load(&path);
        }
    }

    fn load(&mut self, path: &Path) {
        match self.session.load(path) {
            Ok(image) => {
                let (w, h) = image.original_size();
                self.status = format!("{} ({w}x{h})", path.display());
                self.texture_stale = true;
                self.rendered = None;
            }
            Err(e) => warn!("could not load {}: {e}", path.display()),
        }
    }

    fn restart(&mut self) {
        self.session.restart();
        self.texture.clear();
        self.rendered = None;
        self.status.clear();
    }

    fn get_coordinates(&mut self) {
        let rendered = self.rendered.map_or((0.0, 0.0), |s| (s.x, s.y));
        let invocation = match self.session.invocation(rendered) {
            Ok(invocation) => invocation,
            Err(Error::NoSelection) => {
                println!("No rectangle drawn yet.");
                self.status = "No rectangle drawn yet.".into();
                return;
            }
            Err(e) => {
                warn!("{e}");
                self.status = e.to_string();
                return;
            }
        };

        let settings = self.session.settings();
        println!("{}", output::format_rect(invocation.exclude(), settings.format));
        println!("{}", invocation.command_line());
        if settings.deface.print_only {
            self.status = invocation.command_line();
            return;
        }
        self.status = match invocation.run() {
            Ok(out) => format!("Wrote {}", out.display()),
            Err(e) => e.to_string(),
        };
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_stale {
            return;
        }
        self.texture_stale = false;
        if let Some(image) = self.session.image() {
            self.texture.set(ctx, image.display_image());
            let fit = image.fit();
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                fit.width as f32 + 16.0,
                fit.height as f32 + TOOLBAR_HEIGHT,
            )));
        }
    }
}

impl eframe::App for ImageToolApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(path) = self.pending.take() {
            self.load(&path);
        }
        self.sync_texture(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Upload Image").clicked() {
                    self.upload();
                }
                if ui.button("Get Coordinates").clicked() {
                    self.get_coordinates();
                }
                if self.session.image().is_some() && ui.button("Restart").clicked() {
                    self.restart();
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(fit) = self.session.image().map(|img| *img.fit()) else {
                return;
            };
            let size = egui::vec2(fit.width as f32, fit.height as f32);
            let Some(canvas) = canvas::show(ui, &self.texture, size) else {
                return;
            };
            self.rendered = Some(canvas.response.rect.size());
            for event in canvas.events {
                self.session.pointer(event);
            }
            if let Some(corners) = self.session.selector().visible() {
                canvas::paint_rect(
                    ui.painter(),
                    canvas.response.rect.min,
                    corners,
                    egui::Stroke::new(2.0, egui::Color32::RED),
                );
            }
        });
    }
}
