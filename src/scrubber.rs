//! Video playback and rectangle state for the video tool.
//!
//! [`Scrubber::handle`] takes one [`Event`] and answers with the [`Effect`]s the UI has
//! to apply. Nothing here knows about windows or timers; the UI owns a [`TickSchedule`]
//! and feeds [`Event::Tick`] back when it fires.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::{DisplayFit, OriginalRect};
use crate::media::{Frame, FrameSource};
use crate::selector::{PointerEvent, RectSelector};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Playback {
    /// No media loaded.
    #[default]
    Stopped,
    Paused,
    Playing,
}

/// A seek as it arrives from a control.
#[derive(Clone, Debug, PartialEq)]
pub enum SeekRequest {
    /// Slider position.
    Value(f64),
    /// Typed frame number.
    Text(String),
}

impl SeekRequest {
    /// Frame index for a video of `frame_count` frames (0 = unknown length).
    pub fn resolve(&self, frame_count: usize) -> Result<usize> {
        let value = match self {
            SeekRequest::Value(v) => *v,
            SeekRequest::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidSeek(format!("{s:?} is not a frame number")))?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidSeek(format!("{value} is not a frame number")));
        }
        let index = value.trunc() as usize;
        if frame_count > 0 && index >= frame_count {
            return Err(Error::InvalidSeek(format!(
                "frame {index} is past the last frame {}",
                frame_count - 1
            )));
        }
        Ok(index)
    }
}

pub enum Event<S> {
    /// Take ownership of a freshly opened source. Any previous one is released first.
    Load(S),
    Unload,
    TogglePlay,
    Seek(SeekRequest),
    /// The playback timer fired.
    Tick,
    Pointer(PointerEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Replace the shown frame. The rectangle overlay is painted on top of it again.
    Show(Frame),
    /// Fire [`Event::Tick`] after this delay.
    ScheduleTick(Duration),
    /// Stream ran out while playing; the play control goes back to "Play".
    PlaybackEnded,
    /// The previous decoding resource was dropped.
    Released,
}

pub struct Scrubber<S> {
    source: Option<S>,
    playback: Playback,
    position: usize,
    tick: Duration,
    selector: RectSelector,
}

impl<S: FrameSource> Scrubber<S> {
    pub fn new(tick: Duration) -> Self {
        Self {
            source: None,
            playback: Playback::Stopped,
            position: 0,
            tick,
            selector: RectSelector::new(),
        }
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Index of the frame currently shown.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn frame_count(&self) -> usize {
        self.source.as_ref().map_or(0, |s| s.frame_count())
    }

    pub fn fit(&self) -> Option<DisplayFit> {
        self.source.as_ref().map(|s| s.fit())
    }

    pub fn selector(&self) -> &RectSelector {
        &self.selector
    }

    pub fn play_label(&self) -> &'static str {
        match self.playback {
            Playback::Playing => "Pause",
            _ => "Play",
        }
    }

    /// Finalized rectangle in original video pixels.
    pub fn coordinates(&self) -> Result<OriginalRect> {
        if self.selector.finalized().is_none() {
            return Err(Error::NoSelection);
        }
        let fit = self
            .fit()
            .ok_or_else(|| Error::InvalidState("no video loaded".into()))?;
        self.selector.to_original(&fit.scale)
    }

    pub fn handle(&mut self, event: Event<S>) -> Result<Vec<Effect>> {
        match event {
            Event::Load(source) => self.load(source),
            Event::Unload => Ok(self.unload()),
            Event::TogglePlay => Ok(self.toggle()),
            Event::Seek(request) => Ok(self.seek(request)),
            Event::Tick => Ok(self.tick()),
            Event::Pointer(ev) => {
                if self.is_loaded() {
                    self.selector.handle(ev);
                }
                Ok(Vec::new())
            }
        }
    }

    fn unload(&mut self) -> Vec<Effect> {
        self.playback = Playback::Stopped;
        self.position = 0;
        self.selector.clear();
        match self.source.take() {
            Some(source) => {
                drop(source);
                vec![Effect::Released]
            }
            None => Vec::new(),
        }
    }

    fn load(&mut self, source: S) -> Result<Vec<Effect>> {
        let mut effects = self.unload();
        self.source = Some(source);
        match self.read_at(0) {
            Ok(Some(frame)) => {
                self.playback = Playback::Paused;
                effects.push(Effect::Show(frame));
                Ok(effects)
            }
            Ok(None) => {
                self.unload();
                Err(Error::InvalidMedia("video has no frames".into()))
            }
            Err(e) => {
                self.unload();
                Err(e)
            }
        }
    }

    fn toggle(&mut self) -> Vec<Effect> {
        match self.playback {
            Playback::Stopped => Vec::new(),
            Playback::Paused => {
                self.playback = Playback::Playing;
                vec![Effect::ScheduleTick(self.tick)]
            }
            Playback::Playing => {
                self.playback = Playback::Paused;
                Vec::new()
            }
        }
    }

    fn tick(&mut self) -> Vec<Effect> {
        // a tick that outlived its Playing state
        if self.playback != Playback::Playing {
            return Vec::new();
        }
        let next = self.position + 1;
        let read = match self.source.as_mut() {
            Some(source) => source.read_next(),
            None => Ok(None),
        };
        match read {
            Ok(Some(image)) => {
                self.position = next;
                vec![
                    Effect::Show(Frame { index: next, image }),
                    Effect::ScheduleTick(self.tick),
                ]
            }
            Ok(None) => {
                info!("end of stream after frame {}", self.position);
                self.playback = Playback::Paused;
                vec![Effect::PlaybackEnded]
            }
            Err(e) => {
                warn!("decode failed after frame {}: {e}", self.position);
                self.playback = Playback::Paused;
                vec![Effect::PlaybackEnded]
            }
        }
    }

    fn seek(&mut self, request: SeekRequest) -> Vec<Effect> {
        if !self.is_loaded() {
            debug!("seek {request:?} ignored, nothing loaded");
            return Vec::new();
        }
        let index = match request.resolve(self.frame_count()) {
            Ok(index) => index,
            Err(e) => {
                warn!("{e}");
                return Vec::new();
            }
        };
        match self.read_at(index) {
            Ok(Some(frame)) => return vec![Effect::Show(frame)],
            Ok(None) => warn!("frame {index} is past the end of the stream"),
            Err(e) => warn!("seek to frame {index} failed: {e}"),
        }
        self.resume_after(self.position);
        Vec::new()
    }

    /// Puts the source back so the next read yields the frame after `shown`.
    fn resume_after(&mut self, shown: usize) {
        let next = shown + 1;
        if let Some(source) = self.source.as_mut() {
            if let Err(e) = source.seek(next) {
                warn!("could not return to frame {next}: {e}");
            }
        }
    }

    fn read_at(&mut self, index: usize) -> Result<Option<Frame>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };
        source.seek(index)?;
        let frame = source.read_next()?.map(|image| Frame { index, image });
        if frame.is_some() {
            self.position = index;
        }
        Ok(frame)
    }
}

/// One-shot timer driven by the UI frame loop.
///
/// Re-armed by every [`Effect::ScheduleTick`]; playback stops simply by not re-arming.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickSchedule {
    due: Option<Instant>,
}

impl TickSchedule {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn disarm(&mut self) {
        self.due = None;
    }

    /// True once per arming, when `now` has reached the deadline.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DisplayBox, Point};
    use image::RgbaImage;

    /// In-memory video whose frames encode their index in the first pixel.
    struct Strip {
        len: usize,
        reported: usize,
        next: usize,
        fit: DisplayFit,
    }

    impl Strip {
        fn new(len: usize) -> Self {
            Self::reporting(len, len)
        }

        /// `len` real frames behind a container that claims `reported` (0 = unknown).
        fn reporting(len: usize, reported: usize) -> Self {
            Self {
                len,
                reported,
                next: 0,
                fit: DisplayBox::new(8, 6).fit_uniform(16, 12).unwrap(),
            }
        }
    }

    impl FrameSource for Strip {
        fn frame_count(&self) -> usize {
            self.reported
        }

        fn fit(&self) -> DisplayFit {
            self.fit
        }

        fn seek(&mut self, index: usize) -> Result<()> {
            self.next = index;
            Ok(())
        }

        fn read_next(&mut self) -> Result<Option<RgbaImage>> {
            if self.next >= self.len {
                return Ok(None);
            }
            let i = self.next as u8;
            self.next += 1;
            Ok(Some(RgbaImage::from_pixel(8, 6, image::Rgba([i, 0, 0, 255]))))
        }
    }

    fn loaded(len: usize) -> Scrubber<Strip> {
        let mut s = Scrubber::new(Duration::from_millis(20));
        s.handle(Event::Load(Strip::new(len))).unwrap();
        s
    }

    fn shown(effects: &[Effect]) -> Vec<usize> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Show(f) => Some(f.index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_load_pauses_on_first_frame() {
        let mut s = Scrubber::new(Duration::from_millis(20));
        assert_eq!(s.playback(), Playback::Stopped);
        let effects = s.handle(Event::Load(Strip::new(5))).unwrap();
        assert_eq!(shown(&effects), [0]);
        assert_eq!(s.playback(), Playback::Paused);
        assert_eq!(s.play_label(), "Play");
    }

    #[test]
    fn test_load_empty_video_fails() {
        let mut s = Scrubber::new(Duration::from_millis(20));
        assert!(matches!(
            s.handle(Event::Load(Strip::new(0))),
            Err(Error::InvalidMedia(_))
        ));
        assert!(!s.is_loaded());
        assert_eq!(s.playback(), Playback::Stopped);
    }

    #[test]
    fn test_playing_ticks_advance_and_rearm() {
        let mut s = loaded(5);
        let effects = s.handle(Event::TogglePlay).unwrap();
        assert_eq!(effects, [Effect::ScheduleTick(Duration::from_millis(20))]);
        assert_eq!(s.play_label(), "Pause");

        let effects = s.handle(Event::Tick).unwrap();
        assert_eq!(shown(&effects), [1]);
        assert!(effects.contains(&Effect::ScheduleTick(Duration::from_millis(20))));
        assert_eq!(s.position(), 1);
    }

    #[test]
    fn test_tick_after_pause_does_nothing() {
        let mut s = loaded(5);
        s.handle(Event::TogglePlay).unwrap();
        s.handle(Event::TogglePlay).unwrap();
        assert!(s.handle(Event::Tick).unwrap().is_empty());
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_end_of_stream_pauses() {
        let mut s = loaded(2);
        s.handle(Event::TogglePlay).unwrap();
        assert_eq!(shown(&s.handle(Event::Tick).unwrap()), [1]);
        assert_eq!(s.handle(Event::Tick).unwrap(), [Effect::PlaybackEnded]);
        assert_eq!(s.playback(), Playback::Paused);
        assert_eq!(s.play_label(), "Play");
    }

    #[test]
    fn test_seek_keeps_play_state() {
        let mut s = loaded(10);
        assert_eq!(shown(&s.handle(Event::Seek(SeekRequest::Value(7.6))).unwrap()), [7]);
        assert_eq!(s.playback(), Playback::Paused);

        s.handle(Event::TogglePlay).unwrap();
        assert_eq!(shown(&s.handle(Event::Seek(SeekRequest::Value(3.0))).unwrap()), [3]);
        assert_eq!(s.playback(), Playback::Playing);
        assert_eq!(shown(&s.handle(Event::Tick).unwrap()), [4]);
    }

    #[test]
    fn test_bad_seeks_are_ignored() {
        let mut s = loaded(10);
        s.handle(Event::TogglePlay).unwrap();
        for request in [
            SeekRequest::Text("twelve".into()),
            SeekRequest::Value(f64::NAN),
            SeekRequest::Value(-1.0),
            SeekRequest::Value(10.0),
        ] {
            assert!(s.handle(Event::Seek(request)).unwrap().is_empty());
            assert_eq!(s.playback(), Playback::Playing);
            assert_eq!(s.position(), 0);
        }
        assert_eq!(shown(&s.handle(Event::Seek(SeekRequest::Text(" 4 ".into()))).unwrap()), [4]);
    }

    fn first_pixel(effects: &[Effect]) -> Vec<u8> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Show(f) => Some(f.image.get_pixel(0, 0)[0]),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_seek_past_overestimated_end_keeps_playing() {
        let mut s = Scrubber::new(Duration::from_millis(20));
        s.handle(Event::Load(Strip::reporting(10, 12))).unwrap();
        s.handle(Event::TogglePlay).unwrap();

        assert!(s.handle(Event::Seek(SeekRequest::Value(11.0))).unwrap().is_empty());
        assert_eq!(s.playback(), Playback::Playing);
        assert_eq!(s.play_label(), "Pause");
        assert_eq!(s.position(), 0);

        let effects = s.handle(Event::Tick).unwrap();
        assert_eq!(shown(&effects), [1]);
        assert_eq!(first_pixel(&effects), [1]);
    }

    #[test]
    fn test_failed_seek_resumes_after_shown_frame() {
        let mut s = Scrubber::new(Duration::from_millis(20));
        s.handle(Event::Load(Strip::reporting(10, 0))).unwrap();
        s.handle(Event::Seek(SeekRequest::Value(4.0))).unwrap();

        assert!(s.handle(Event::Seek(SeekRequest::Value(50.0))).unwrap().is_empty());
        assert_eq!(s.position(), 4);
        assert_eq!(s.playback(), Playback::Paused);

        s.handle(Event::TogglePlay).unwrap();
        let effects = s.handle(Event::Tick).unwrap();
        assert_eq!(shown(&effects), [5]);
        assert_eq!(first_pixel(&effects), [5]);
    }

    #[test]
    fn test_seek_resolve_unknown_length() {
        assert_eq!(SeekRequest::Value(5000.0).resolve(0).unwrap(), 5000);
        assert!(SeekRequest::Value(5000.0).resolve(300).is_err());
        assert_eq!(SeekRequest::Text("299".into()).resolve(300).unwrap(), 299);
    }

    #[test]
    fn test_rectangle_survives_frames_and_scales() {
        let mut s = loaded(10);
        s.handle(Event::Pointer(PointerEvent::Press(Point::new(1.0, 1.0))))
            .unwrap();
        s.handle(Event::Pointer(PointerEvent::Release(Point::new(4.0, 3.0))))
            .unwrap();
        s.handle(Event::Seek(SeekRequest::Value(6.0))).unwrap();
        assert!(s.selector().finalized().is_some());
        // 16x12 shown at 8x6
        assert_eq!(s.coordinates().unwrap(), OriginalRect::new(2, 2, 8, 6));
    }

    #[test]
    fn test_pointer_ignored_without_video() {
        let mut s: Scrubber<Strip> = Scrubber::new(Duration::from_millis(20));
        s.handle(Event::Pointer(PointerEvent::Press(Point::new(1.0, 1.0))))
            .unwrap();
        assert!(s.selector().visible().is_none());
        assert!(matches!(s.coordinates(), Err(Error::NoSelection)));
    }

    #[test]
    fn test_tick_schedule() {
        let start = Instant::now();
        let mut schedule = TickSchedule::default();
        assert!(!schedule.take_due(start));

        schedule.arm(start, Duration::from_millis(20));
        assert_eq!(schedule.remaining(start), Some(Duration::from_millis(20)));
        assert!(!schedule.take_due(start + Duration::from_millis(10)));
        assert!(schedule.take_due(start + Duration::from_millis(20)));
        assert!(!schedule.take_due(start + Duration::from_millis(40)));

        schedule.arm(start, Duration::from_millis(20));
        schedule.disarm();
        assert_eq!(schedule.remaining(start), None);
    }
}
