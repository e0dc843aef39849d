use std::path::{Path, PathBuf};
use std::time::Instant;

use log::warn;

use super::canvas::{self, MediaTexture};
use super::VIDEO_EXTENSIONS;
use crate::config::Settings;
use crate::error::Error;
use crate::media::FfmpegSource;
use crate::output;
use crate::scrubber::{Effect, Event, Scrubber, SeekRequest, TickSchedule};

pub struct VideoToolApp {
    settings: Settings,
    scrubber: Scrubber<FfmpegSource>,
    texture: MediaTexture,
    schedule: TickSchedule,
    slider: f64,
    goto: String,
    pending: Option<PathBuf>,
    status: String,
}

impl VideoToolApp {
    pub fn new(settings: Settings, initial: Option<PathBuf>) -> Self {
        Self {
            scrubber: Scrubber::new(settings.tick),
            settings,
            texture: MediaTexture::default(),
            schedule: TickSchedule::default(),
            slider: 0.0,
            goto: String::new(),
            pending: initial,
            status: String::new(),
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, event: Event<FfmpegSource>) {
        match self.scrubber.handle(event) {
            Ok(effects) => self.apply(ctx, effects),
            Err(e) => {
                warn!("{e}");
                self.status = e.to_string();
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Show(frame) => {
                    self.texture.set(ctx, &frame.image);
                    self.slider = frame.index as f64;
                }
                Effect::ScheduleTick(delay) => self.schedule.arm(Instant::now(), delay),
                Effect::PlaybackEnded => {
                    self.schedule.disarm();
                    self.status = "End of video".into();
                }
                Effect::Released => {
                    self.schedule.disarm();
                    self.texture.clear();
                    self.slider = 0.0;
                }
            }
        }
    }

    fn upload(&mut self, ctx: &egui::Context) {
        // controls stay disabled until the new video is confirmed
        self.dispatch(ctx, Event::Unload);
        let picked = rfd::FileDialog::new()
            .add_filter("Videos", VIDEO_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.open(ctx, &path);
        }
    }

    fn open(&mut self, ctx: &egui::Context, path: &Path) {
        match FfmpegSource::open(path, &self.settings.decoder, self.settings.display) {
            Ok(source) => {
                let info = source.info();
                self.status = format!(
                    "{} ({}x{}, {:.2} fps)",
                    path.display(),
                    info.width,
                    info.height,
                    info.fps
                );
                self.dispatch(ctx, Event::Load(source));
            }
            Err(e) => warn!("could not open {}: {e}", path.display()),
        }
    }

    fn save_coordinates(&mut self) {
        match self.scrubber.coordinates() {
            Ok(rect) => {
                let line = output::format_rect(
                    output::reported(rect, &self.settings),
                    self.settings.format,
                );
                println!("{line}");
                self.status = line;
            }
            Err(Error::NoSelection) => {
                println!("No rectangle drawn yet.");
                self.status = "No rectangle drawn yet.".into();
            }
            Err(e) => {
                warn!("{e}");
                self.status = e.to_string();
            }
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let loaded = self.scrubber.is_loaded();
        ui.horizontal(|ui| {
            let label = self.scrubber.play_label();
            if ui.add_enabled(loaded, egui::Button::new(label)).clicked() {
                self.dispatch(ctx, Event::TogglePlay);
            }
            if ui
                .add_enabled(loaded, egui::Button::new("Save Coordinates"))
                .clicked()
            {
                self.save_coordinates();
            }
            if ui.button("Upload Video").clicked() {
                self.upload(ctx);
            }
        });

        ui.horizontal(|ui| {
            let last = self.scrubber.frame_count().saturating_sub(1) as f64;
            let slider = egui::Slider::new(&mut self.slider, 0.0..=last)
                .integer()
                .text("frame");
            if ui.add_enabled(loaded, slider).changed() {
                let value = self.slider;
                self.dispatch(ctx, Event::Seek(SeekRequest::Value(value)));
            }

            let entry = ui.add_enabled(
                loaded,
                egui::TextEdit::singleline(&mut self.goto).desired_width(64.0),
            );
            let submitted = entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.add_enabled(loaded, egui::Button::new("Go to frame")).clicked() || submitted {
                let text = self.goto.clone();
                self.dispatch(ctx, Event::Seek(SeekRequest::Text(text)));
            }
        });
    }
}

impl eframe::App for VideoToolApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(path) = self.pending.take() {
            self.open(ctx, &path);
        }
        if self.schedule.take_due(Instant::now()) {
            self.dispatch(ctx, Event::Tick);
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.toolbar(ctx, ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(fit) = self.scrubber.fit() else {
                return;
            };
            let size = egui::vec2(fit.width as f32, fit.height as f32);
            let Some(canvas) = canvas::show(ui, &self.texture, size) else {
                return;
            };
            for event in canvas.events {
                self.dispatch(ctx, Event::Pointer(event));
            }
            // the frame underneath was replaced; the rectangle goes back on top
            if let Some(corners) = self.scrubber.selector().visible() {
                canvas::paint_rect(
                    ui.painter(),
                    canvas.response.rect.min,
                    corners,
                    egui::Stroke::new(2.0, egui::Color32::GREEN),
                );
            }
        });

        if let Some(remaining) = self.schedule.remaining(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
    }
}
