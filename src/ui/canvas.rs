//! Painting media plus the rectangle overlay, and turning egui drags into pointer events.

use image::RgbaImage;

use crate::geometry::{Corners, Point};
use crate::selector::PointerEvent;

/// The single texture a tool shows, replaced wholesale on every new frame.
#[derive(Default)]
pub struct MediaTexture {
    handle: Option<egui::TextureHandle>,
}

impl MediaTexture {
    pub fn set(&mut self, ctx: &egui::Context, image: &RgbaImage) {
        let size = [image.width() as usize, image.height() as usize];
        let pixels = image.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        match self.handle.as_mut() {
            Some(handle) => handle.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.handle =
                    Some(ctx.load_texture("media", color_image, egui::TextureOptions::LINEAR));
            }
        }
    }

    pub fn clear(&mut self) {
        self.handle = None;
    }
}

pub struct Canvas {
    pub response: egui::Response,
    pub events: Vec<PointerEvent>,
}

/// Paints the texture at `size` in the top-left of the available space and collects the
/// primary-button drag as display-space pointer events.
pub fn show(ui: &mut egui::Ui, texture: &MediaTexture, size: egui::Vec2) -> Option<Canvas> {
    let handle = texture.handle.as_ref()?;
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    painter.image(
        handle.id(),
        response.rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
    let events = pointer_events(ui.ctx(), &response);
    Some(Canvas { response, events })
}

fn pointer_events(ctx: &egui::Context, response: &egui::Response) -> Vec<PointerEvent> {
    let origin = response.rect.min;
    let local = |p: egui::Pos2| Point::new(p.x - origin.x, p.y - origin.y);
    let mut events = Vec::new();

    if response.drag_started_by(egui::PointerButton::Primary) {
        // egui reports the drag once the pointer has moved; the press happened earlier
        let press = ctx
            .input(|i| i.pointer.press_origin())
            .or(response.interact_pointer_pos());
        if let Some(p) = press {
            events.push(PointerEvent::Press(local(p)));
        }
    }
    if response.dragged_by(egui::PointerButton::Primary) {
        if let Some(p) = response.interact_pointer_pos() {
            events.push(PointerEvent::Drag(local(p)));
        }
    }
    if response.drag_stopped_by(egui::PointerButton::Primary) {
        let end = response
            .hover_pos()
            .or(ctx.input(|i| i.pointer.latest_pos()));
        if let Some(p) = end {
            events.push(PointerEvent::Release(local(p)));
        }
    }
    events
}

/// Outline of `corners` drawn over the canvas whose top-left is `origin`.
pub fn paint_rect(painter: &egui::Painter, origin: egui::Pos2, corners: Corners, stroke: egui::Stroke) {
    let a = origin + egui::vec2(corners.first.x, corners.first.y);
    let b = origin + egui::vec2(corners.second.x, corners.second.y);
    painter.rect_stroke(
        egui::Rect::from_two_pos(a, b),
        0.0,
        stroke,
        egui::StrokeKind::Middle,
    );
}
