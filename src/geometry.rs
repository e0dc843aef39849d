//! Display-space and original-space coordinates.
//!
//! Media is shown shrunk (or grown) to fit a fixed display box. Everything the operator
//! draws lives in display space; everything we report lives in original space. The
//! [`ScaleFactor`] produced when fitting is what maps one onto the other.

use serde::Serialize;

use crate::error::{Error, Result};

/// A pointer position in display space, relative to the top-left of the shown media.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Two corners of a rectangle, kept exactly as drawn.
///
/// `first` is where the pointer went down and `second` where it was released, so the
/// second corner may sit in any direction from the first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners {
    pub first: Point,
    pub second: Point,
}

impl Corners {
    /// Degenerate rectangle with both corners on `p`.
    pub fn at(p: Point) -> Self {
        Self {
            first: p,
            second: p,
        }
    }

    pub fn new(first: Point, second: Point) -> Self {
        Self { first, second }
    }

    /// Reorder into top-left / bottom-right.
    pub fn normalized(&self) -> Self {
        Self {
            first: Point::new(
                self.first.x.min(self.second.x),
                self.first.y.min(self.second.y),
            ),
            second: Point::new(
                self.first.x.max(self.second.x),
                self.first.y.max(self.second.y),
            ),
        }
    }
}

/// Rectangle in original media pixels, `(x1, y1, x2, y2)` in drawing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OriginalRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl OriginalRect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Maximum on-screen area media is fitted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for DisplayBox {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
        }
    }
}

/// Result of fitting media into a [`DisplayBox`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayFit {
    pub width: u32,
    pub height: u32,
    pub scale: ScaleFactor,
}

impl DisplayBox {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    fn check(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidMedia(format!(
                "media dimensions must be positive, got {width}x{height}"
            )));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(Error::InvalidState(format!(
                "display box must be positive, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        Ok(())
    }

    /// Aspect-ratio fit used for still images.
    ///
    /// Clamps whichever axis is relatively wider to the box and derives the other one.
    /// The two scale factors are kept independently.
    pub fn fit_aspect(&self, width: u32, height: u32) -> Result<DisplayFit> {
        self.check(width, height)?;
        let (mw, mh) = (self.max_width as f64, self.max_height as f64);
        let aspect = width as f64 / height as f64;

        let (w, h) = if aspect > mw / mh {
            (self.max_width, clamp_axis(mw / aspect, self.max_height))
        } else {
            (clamp_axis(mh * aspect, self.max_width), self.max_height)
        };

        Ok(DisplayFit {
            width: w,
            height: h,
            scale: ScaleFactor::PerAxis {
                sx: width as f32 / w as f32,
                sy: height as f32 / h as f32,
            },
        })
    }

    /// Letterbox fit used for video: one factor `min(MW/W, MH/H)` on both axes.
    pub fn fit_uniform(&self, width: u32, height: u32) -> Result<DisplayFit> {
        self.check(width, height)?;
        let scale = (self.max_width as f64 / width as f64)
            .min(self.max_height as f64 / height as f64);

        let shown_w = clamp_axis(width as f64 * scale, self.max_width);
        let shown_h = clamp_axis(height as f64 * scale, self.max_height);
        // an axis pinned to 1 px no longer follows `scale`; read back against what is shown
        let pinned =
            (width as f64 * scale).round() < 1.0 || (height as f64 * scale).round() < 1.0;
        let scale = if pinned {
            ScaleFactor::PerAxis {
                sx: width as f32 / shown_w as f32,
                sy: height as f32 / shown_h as f32,
            }
        } else {
            ScaleFactor::Uniform {
                scale: scale as f32,
            }
        };

        Ok(DisplayFit {
            width: shown_w,
            height: shown_h,
            scale,
        })
    }
}

fn clamp_axis(value: f64, max: u32) -> u32 {
    (value.round() as u32).clamp(1, max)
}

/// Conversion between display and original space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleFactor {
    /// Original pixels per display pixel, per axis.
    PerAxis { sx: f32, sy: f32 },
    /// Display pixels per original pixel, shared by both axes.
    Uniform { scale: f32 },
}

impl ScaleFactor {
    /// Per-axis factors from the size the media was actually rendered at.
    pub fn from_rendered(original: (u32, u32), rendered: (f32, f32)) -> Result<Self> {
        let (rw, rh) = rendered;
        if !(rw > 0.0 && rh > 0.0) {
            return Err(Error::InvalidState(format!(
                "canvas has no area ({rw}x{rh})"
            )));
        }
        Ok(ScaleFactor::PerAxis {
            sx: original.0 as f32 / rw,
            sy: original.1 as f32 / rh,
        })
    }

    pub fn to_original(&self, corners: Corners) -> OriginalRect {
        let (x1, y1) = self.point_to_original(corners.first);
        let (x2, y2) = self.point_to_original(corners.second);
        OriginalRect::new(x1, y1, x2, y2)
    }

    pub fn to_display(&self, rect: OriginalRect) -> Corners {
        Corners::new(
            self.point_to_display(rect.x1, rect.y1),
            self.point_to_display(rect.x2, rect.y2),
        )
    }

    fn point_to_original(&self, p: Point) -> (i32, i32) {
        let (x, y) = match *self {
            ScaleFactor::PerAxis { sx, sy } => (p.x * sx, p.y * sy),
            ScaleFactor::Uniform { scale } => (p.x / scale, p.y / scale),
        };
        (x.round() as i32, y.round() as i32)
    }

    fn point_to_display(&self, x: i32, y: i32) -> Point {
        let (x, y) = (x as f32, y as f32);
        match *self {
            ScaleFactor::PerAxis { sx, sy } => Point::new(x / sx, y / sy),
            ScaleFactor::Uniform { scale } => Point::new(x * scale, y * scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_fits(fit: &DisplayFit, bx: DisplayBox, w: u32, h: u32) {
        assert!(fit.width <= bx.max_width, "{fit:?} wider than {bx:?}");
        assert!(fit.height <= bx.max_height, "{fit:?} taller than {bx:?}");
        assert!(
            fit.width == bx.max_width || fit.height == bx.max_height,
            "{fit:?} touches neither edge of {bx:?}"
        );
        // derived axis is within rounding of the exact value, unless pinned to 1 or the box
        let aspect = w as f64 / h as f64;
        let (derived, exact, max) = if fit.width == bx.max_width {
            (fit.height, bx.max_width as f64 / aspect, bx.max_height)
        } else {
            (fit.width, bx.max_height as f64 * aspect, bx.max_width)
        };
        assert!(
            (derived as f64 - exact).abs() <= 0.5 || derived == 1 || derived == max,
            "{w}x{h} -> {}x{} loses aspect",
            fit.width,
            fit.height
        );
    }

    #[test]
    fn test_fit_aspect_landscape_and_portrait() {
        let bx = DisplayBox::default();
        let fit = bx.fit_aspect(1600, 1200).unwrap();
        assert_eq!((fit.width, fit.height), (800, 600));
        assert_eq!(fit.scale, ScaleFactor::PerAxis { sx: 2.0, sy: 2.0 });

        let fit = bx.fit_aspect(1920, 1080).unwrap();
        assert_eq!((fit.width, fit.height), (800, 450));

        let fit = bx.fit_aspect(1080, 1920).unwrap();
        assert_eq!((fit.width, fit.height), (338, 600));
    }

    #[test]
    fn test_fit_aspect_grows_small_images() {
        let fit = DisplayBox::default().fit_aspect(200, 100).unwrap();
        assert_eq!((fit.width, fit.height), (800, 400));
        assert_eq!(fit.scale, ScaleFactor::PerAxis { sx: 0.25, sy: 0.25 });
    }

    #[test]
    fn test_fit_uniform_letterboxes() {
        let bx = DisplayBox::default();
        let fit = bx.fit_uniform(1920, 1080).unwrap();
        assert_eq!((fit.width, fit.height), (800, 450));
        match fit.scale {
            ScaleFactor::Uniform { scale } => assert!((scale - 800.0 / 1920.0).abs() < 1e-6),
            other => panic!("unexpected scale {other:?}"),
        }

        let fit = bx.fit_uniform(640, 480).unwrap();
        assert_eq!((fit.width, fit.height), (800, 600));
    }

    #[test]
    fn test_fit_uniform_thin_media_reads_back_inside() {
        let fit = DisplayBox::default().fit_uniform(5000, 1).unwrap();
        assert_eq!((fit.width, fit.height), (800, 1));
        assert_eq!(fit.scale, ScaleFactor::PerAxis { sx: 6.25, sy: 1.0 });
        let far = Corners::new(Point::new(0.0, 0.0), Point::new(800.0, 1.0));
        assert_eq!(fit.scale.to_original(far), OriginalRect::new(0, 0, 5000, 1));
    }

    #[test]
    fn test_fit_stays_inside_box() {
        let boxes = [
            DisplayBox::new(800, 600),
            DisplayBox::new(640, 640),
            DisplayBox::new(333, 777),
        ];
        let sizes = [
            (1, 1),
            (1, 5000),
            (5000, 1),
            (1600, 1200),
            (1279, 719),
            (3840, 2160),
            (601, 799),
            (17, 3),
        ];
        for bx in boxes {
            for &(w, h) in &sizes {
                assert_fits(&bx.fit_aspect(w, h).unwrap(), bx, w, h);
                let uniform = bx.fit_uniform(w, h).unwrap();
                assert!(uniform.width <= bx.max_width && uniform.height <= bx.max_height);
                assert!(uniform.width == bx.max_width || uniform.height == bx.max_height);
            }
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let bx = DisplayBox::default();
        assert!(matches!(bx.fit_aspect(0, 10), Err(Error::InvalidMedia(_))));
        assert!(matches!(bx.fit_uniform(10, 0), Err(Error::InvalidMedia(_))));
        assert!(matches!(
            DisplayBox::new(0, 600).fit_aspect(10, 10),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_rendered_guards_empty_canvas() {
        assert!(matches!(
            ScaleFactor::from_rendered((1600, 1200), (0.0, 600.0)),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            ScaleFactor::from_rendered((1600, 1200), (800.0, f32::NAN)),
            Err(Error::InvalidState(_))
        ));
        let scale = ScaleFactor::from_rendered((1600, 1200), (800.0, 600.0)).unwrap();
        assert_eq!(scale, ScaleFactor::PerAxis { sx: 2.0, sy: 2.0 });
    }

    #[test]
    fn test_to_original_rounds() {
        let scale = ScaleFactor::PerAxis { sx: 1.5, sy: 2.5 };
        let rect = scale.to_original(Corners::new(Point::new(1.0, 1.0), Point::new(3.3, 0.1)));
        assert_eq!(rect, OriginalRect::new(2, 3, 5, 0));

        let scale = ScaleFactor::Uniform { scale: 0.5 };
        let rect = scale.to_original(Corners::new(Point::new(10.2, 0.0), Point::new(4.0, 7.8)));
        assert_eq!(rect, OriginalRect::new(20, 0, 8, 16));
    }

    #[test]
    fn test_round_trip_within_one_pixel() {
        let scales = [
            ScaleFactor::PerAxis { sx: 2.0, sy: 2.0 },
            ScaleFactor::PerAxis { sx: 2.4, sy: 1.8 },
            ScaleFactor::PerAxis { sx: 1.0, sy: 1.0 },
            ScaleFactor::Uniform { scale: 800.0 / 1920.0 },
            ScaleFactor::Uniform { scale: 1.25 },
        ];
        let drawn = [
            Corners::new(Point::new(100.0, 50.0), Point::new(300.0, 150.0)),
            Corners::new(Point::new(799.0, 599.0), Point::new(0.0, 0.0)),
            Corners::new(Point::new(12.4, 87.6), Point::new(13.5, 88.5)),
        ];
        for scale in scales {
            for corners in drawn {
                let back = scale.to_display(scale.to_original(corners));
                for (a, b) in [
                    (corners.first.x, back.first.x),
                    (corners.first.y, back.first.y),
                    (corners.second.x, back.second.x),
                    (corners.second.y, back.second.y),
                ] {
                    assert!((a - b).abs() <= 1.0, "{scale:?}: {corners:?} came back as {back:?}");
                }
            }
        }
    }

    #[test]
    fn test_normalized_orders_corners() {
        let c = Corners::new(Point::new(100.0, 20.0), Point::new(50.0, 80.0)).normalized();
        assert_eq!(c, Corners::new(Point::new(50.0, 20.0), Point::new(100.0, 80.0)));
        assert_eq!(
            OriginalRect::new(9, 1, 3, 7).normalized(),
            OriginalRect::new(3, 1, 9, 7)
        );
    }
}
