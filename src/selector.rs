//! Pointer-driven rectangle selection.

use crate::error::{Error, Result};
use crate::geometry::{Corners, OriginalRect, Point, ScaleFactor};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Selection {
    #[default]
    Idle,
    /// Pointer held down; `second` follows the pointer.
    Drawing(Corners),
    /// Pointer released.
    Drawn(Corners),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Press(Point),
    Drag(Point),
    Release(Point),
}

/// Tracks one exclusion rectangle in display space.
///
/// A new press always discards whatever was there before, finalized or not.
#[derive(Clone, Debug, Default)]
pub struct RectSelector {
    state: Selection,
}

impl RectSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Selection {
        self.state
    }

    pub fn handle(&mut self, event: PointerEvent) {
        self.state = match (self.state, event) {
            (_, PointerEvent::Press(p)) => Selection::Drawing(Corners::at(p)),
            (Selection::Drawing(c), PointerEvent::Drag(p)) => {
                Selection::Drawing(Corners::new(c.first, p))
            }
            (Selection::Drawing(c), PointerEvent::Release(p)) => {
                Selection::Drawn(Corners::new(c.first, p))
            }
            // drag or release without a press on our canvas
            (state, _) => state,
        };
    }

    pub fn press(&mut self, p: Point) {
        self.handle(PointerEvent::Press(p));
    }

    pub fn drag(&mut self, p: Point) {
        self.handle(PointerEvent::Drag(p));
    }

    pub fn release(&mut self, p: Point) {
        self.handle(PointerEvent::Release(p));
    }

    pub fn clear(&mut self) {
        self.state = Selection::Idle;
    }

    /// Rectangle to paint: the live one while drawing, the finalized one afterwards.
    pub fn visible(&self) -> Option<Corners> {
        match self.state {
            Selection::Idle => None,
            Selection::Drawing(c) | Selection::Drawn(c) => Some(c),
        }
    }

    pub fn finalized(&self) -> Option<Corners> {
        match self.state {
            Selection::Drawn(c) => Some(c),
            _ => None,
        }
    }

    /// Finalized rectangle in original media pixels, corners in drawing order.
    pub fn to_original(&self, scale: &ScaleFactor) -> Result<OriginalRect> {
        self.finalized()
            .map(|c| scale.to_original(c))
            .ok_or(Error::NoSelection)
    }
}
