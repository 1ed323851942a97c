use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::foundation::math::num_digits;
use crate::render::format::ImageFormat;
use crate::render::surface::FrameRGB;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Playback frame rate.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub frames: u64,
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing indices starting at 0.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> CheckergenResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGB) -> CheckergenResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> CheckergenResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGB)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGB)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> CheckergenResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGB) -> CheckergenResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CheckergenResult<()> {
        Ok(())
    }
}

/// Writes every frame as `{name}{index}.{ext}` into a directory.
///
/// The index is zero-padded to the digit count of the last frame index.
#[derive(Debug)]
pub struct ImageSequenceSink {
    dir: PathBuf,
    name: String,
    format: ImageFormat,
    digits: usize,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl ImageSequenceSink {
    /// Create a sink writing into the existing directory `dir`.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>, format: ImageFormat) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            format,
            digits: 1,
            last_idx: None,
            written: 0,
        }
    }

    /// Number of images written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the image for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!(
            "{}{:0width$}.{}",
            self.name,
            idx.0,
            self.format.extension(),
            width = self.digits
        ))
    }
}

impl FrameSink for ImageSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> CheckergenResult<()> {
        if !self.dir.is_dir() {
            return Err(CheckergenError::invalid_config(format!(
                "export path '{}' is not a directory",
                self.dir.display()
            )));
        }
        self.digits = num_digits(cfg.frames.saturating_sub(1));
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGB) -> CheckergenResult<()> {
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(CheckergenError::validation(format!(
                "frames must be pushed in increasing order (got {} after {})",
                idx.0, last.0
            )));
        }
        frame.save(&self.frame_path(idx), self.format)?;
        self.last_idx = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> CheckergenResult<()> {
        tracing::debug!(written = self.written, dir = %self.dir.display(), "image sequence complete");
        Ok(())
    }
}
