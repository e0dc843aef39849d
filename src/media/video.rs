//! Video decoding through external `ffprobe` / `ffmpeg` processes.

use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbaImage;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::config::DecoderSettings;
use crate::error::{Error, Result};
use crate::geometry::{DisplayBox, DisplayFit};

/// Frame rate assumed when the container does not report one.
const FALLBACK_FPS: f64 = 25.0;

/// A decoded frame, already scaled to display size.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub image: RgbaImage,
}

/// Sequential frame access with seek-by-index.
///
/// Dropping a source releases whatever decoding resource it holds.
pub trait FrameSource {
    /// Total frames, or 0 when the container does not say.
    fn frame_count(&self) -> usize;

    fn fit(&self) -> DisplayFit;

    /// Position the source so that the next [`FrameSource::read_next`] yields `index`.
    fn seek(&mut self, index: usize) -> Result<()>;

    /// Next frame in display size, `None` at end of stream.
    fn read_next(&mut self) -> Result<Option<RgbaImage>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub fps: f64,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<i64>,
    height: Option<i64>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// Parses `"30000/1001"` or `"25"`; `"0/0"` and friends are `None`.
fn parse_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.trim().parse::<f64>().ok()? / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Builds [`VideoInfo`] from `ffprobe -of json -show_entries stream=...` output.
pub fn parse_probe(json: &str) -> Result<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_str(json)?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidMedia("no video stream".into()))?;

    let dimension = |value: Option<i64>, name: &str| -> Result<u32> {
        match value {
            Some(v) if v > 0 => u32::try_from(v)
                .map_err(|_| Error::InvalidMedia(format!("{name} {v} is too large"))),
            other => Err(Error::InvalidMedia(format!("invalid {name}: {other:?}"))),
        }
    };
    let width = dimension(stream.width, "width")?;
    let height = dimension(stream.height, "height")?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))
        .unwrap_or(FALLBACK_FPS);

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .or_else(|| {
            let duration: f64 = stream.duration.as_deref()?.trim().parse().ok()?;
            (duration.is_finite() && duration > 0.0).then(|| (duration * fps).round() as usize)
        })
        .unwrap_or(0);

    Ok(VideoInfo {
        width,
        height,
        frame_count,
        fps,
    })
}

pub fn probe(ffprobe: &Path, path: &Path) -> Result<VideoInfo> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,nb_frames,r_frame_rate,avg_frame_rate,duration",
            "-of",
            "json",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(Error::Probe(format!(
            "{} exited with {}: {}",
            ffprobe.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    parse_probe(&String::from_utf8_lossy(&output.stdout))
}

struct Decoder {
    child: Child,
    stdout: BufReader<ChildStdout>,
}

/// Streams raw RGBA frames out of a long-lived `ffmpeg` child.
///
/// Seeking restarts the child at the frame's timestamp; the child is spawned lazily on
/// the first read after open or seek.
pub struct FfmpegSource {
    ffmpeg: PathBuf,
    path: PathBuf,
    info: VideoInfo,
    fit: DisplayFit,
    next_index: usize,
    decoder: Option<Decoder>,
}

impl FfmpegSource {
    pub fn open(path: &Path, decoders: &DecoderSettings, display_box: DisplayBox) -> Result<Self> {
        let info = probe(&decoders.ffprobe, path)?;
        let fit = display_box.fit_uniform(info.width, info.height)?;
        info!(
            "opened {}: {}x{} @ {:.3} fps, {} frames, shown at {}x{}",
            path.display(),
            info.width,
            info.height,
            info.fps,
            info.frame_count,
            fit.width,
            fit.height
        );
        Ok(Self {
            ffmpeg: decoders.ffmpeg.clone(),
            path: path.to_path_buf(),
            info,
            fit,
            next_index: 0,
            decoder: None,
        })
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn frame_len(&self) -> usize {
        self.fit.width as usize * self.fit.height as usize * 4
    }

    fn spawn(&self) -> Result<Decoder> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-v", "error", "-nostdin"]);
        if self.next_index > 0 {
            let timestamp = self.next_index as f64 / self.info.fps;
            cmd.arg("-ss").arg(format!("{timestamp:.6}"));
        }
        cmd.arg("-i")
            .arg(&self.path)
            .args(["-an", "-sn", "-vf"])
            .arg(format!("scale={}:{}", self.fit.width, self.fit.height))
            .args(["-pix_fmt", "rgba", "-f", "rawvideo", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        debug!("spawning decoder at frame {}", self.next_index);
        let mut child = cmd.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::InvalidState("decoder has no stdout".into()))?;
        Ok(Decoder {
            child,
            stdout: BufReader::new(stdout),
        })
    }

    fn release(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            if let Err(e) = decoder.child.kill() {
                // already exited on its own
                debug!("decoder kill: {e}");
            }
            if let Err(e) = decoder.child.wait() {
                warn!("failed to reap decoder for {}: {e}", self.path.display());
            }
        }
    }
}

impl FrameSource for FfmpegSource {
    fn frame_count(&self) -> usize {
        self.info.frame_count
    }

    fn fit(&self) -> DisplayFit {
        self.fit
    }

    fn seek(&mut self, index: usize) -> Result<()> {
        self.release();
        self.next_index = index;
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<RgbaImage>> {
        if self.decoder.is_none() {
            self.decoder = Some(self.spawn()?);
        }
        let mut buf = vec![0u8; self.frame_len()];
        let read = match self.decoder.as_mut() {
            Some(decoder) => decoder.stdout.read_exact(&mut buf),
            None => return Ok(None),
        };
        match read {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                debug!("end of stream at frame {}", self.next_index);
                self.release();
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        self.next_index += 1;
        RgbaImage::from_raw(self.fit.width, self.fit.height, buf)
            .map(Some)
            .ok_or_else(|| Error::InvalidState("frame buffer size mismatch".into()))
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.release();
        info!("released decoder for {}", self.path.display());
    }
}
