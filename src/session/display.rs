//! On-screen playback loop.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::foundation::core::Fps;
use crate::foundation::error::CheckergenResult;
use crate::project::model::Project;
use crate::render::surface::FrameRGB;
use crate::signal::{Signal, SignalSession};

/// Destination of displayed frames.
pub trait Presenter {
    /// Show `frame`.
    fn present(&mut self, frame: &FrameRGB) -> CheckergenResult<()>;

    /// `true` once the user asked to stop (window closed, escape pressed).
    fn close_requested(&self) -> bool {
        false
    }
}

/// Presenter that keeps presented frames in memory and asks to close after `limit` frames.
#[derive(Debug, Default)]
pub struct CapturePresenter {
    limit: Option<usize>,
    keep: bool,
    count: usize,
    frames: Vec<FrameRGB>,
}

impl CapturePresenter {
    /// Keep every frame, ask to close after `limit` frames when given.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            keep: true,
            count: 0,
            frames: Vec::new(),
        }
    }

    /// Count frames without keeping them.
    pub fn counting(limit: Option<usize>) -> Self {
        Self {
            keep: false,
            ..Self::new(limit)
        }
    }

    /// Frames presented so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Kept frames in presentation order.
    pub fn frames(&self) -> &[FrameRGB] {
        &self.frames
    }
}

impl Presenter for CapturePresenter {
    fn present(&mut self, frame: &FrameRGB) -> CheckergenResult<()> {
        self.count += 1;
        if self.keep {
            self.frames.push(frame.clone());
        }
        Ok(())
    }

    fn close_requested(&self) -> bool {
        self.limit.is_some_and(|n| self.count >= n)
    }
}

/// Shared stop flag for a running session. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the session to stop after the current frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Paces a loop at a fixed frame rate against a monotonic clock.
///
/// Deadlines are computed from the start instant and the frame count, so a late frame does not
/// shift every later one.
#[derive(Debug)]
pub struct FrameTicker {
    period: Duration,
    start: Option<Instant>,
    last: Option<Instant>,
    ticks: u32,
}

impl FrameTicker {
    /// Ticker for `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            period: fps.frame_duration(),
            start: None,
            last: None,
            ticks: 0,
        }
    }

    /// Nominal time between ticks.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the next tick is due. Returns the time since the previous tick, `None` on the
    /// first call.
    pub fn tick(&mut self) -> Option<Duration> {
        let now = Instant::now();
        let start = *self.start.get_or_insert(now);
        let due = self
            .period
            .checked_mul(self.ticks)
            .and_then(|d| start.checked_add(d))
            .unwrap_or(now);
        if due > now {
            std::thread::sleep(due - now);
        } else if now.duration_since(due) > self.period {
            // Fell more than a frame behind; restart the schedule instead of bursting.
            self.start = Some(now);
            self.ticks = 0;
        }
        self.ticks = self.ticks.saturating_add(1);
        let now = Instant::now();
        self.last.replace(now).map(|prev| now.duration_since(prev))
    }

    /// Same bookkeeping as [`FrameTicker::tick`] without sleeping.
    pub fn mark(&mut self) -> Option<Duration> {
        let now = Instant::now();
        self.ticks = self.ticks.saturating_add(1);
        self.last.replace(now).map(|prev| now.duration_since(prev))
    }
}

/// Options for one playback run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayOpts {
    /// Ask the presenter backend for a fullscreen surface.
    pub fullscreen: bool,
    /// Write frame-to-frame intervals (milliseconds, one per line) to this file.
    pub log_path: Option<PathBuf>,
    /// Sleep to hold the project frame rate; off for headless presenters.
    pub pace: bool,
}

impl Default for DisplayOpts {
    fn default() -> Self {
        Self {
            fullscreen: false,
            log_path: None,
            pace: true,
        }
    }
}

impl DisplayOpts {
    /// Interval log path `{name}.log` in the working directory.
    pub fn log_path_for(name: &str) -> PathBuf {
        PathBuf::from(format!("{name}.log"))
    }
}

/// Summary of a finished playback run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayStats {
    /// Frames presented.
    pub frames: u64,
    /// Intervals between consecutive frames.
    pub intervals: Vec<Duration>,
}

/// Play `project` until `cancel` fires or the presenter asks to close.
///
/// Every board starts from its initial phase. When `signals` is given, a group-start code goes
/// out before the first frame and a group-stop code after the last one; signaling errors are
/// logged and never stop playback.
#[tracing::instrument(skip_all, fields(project = %project.name(), fps = %project.fps()))]
pub fn run_display(
    project: &mut Project,
    presenter: &mut dyn Presenter,
    opts: &DisplayOpts,
    cancel: &CancelToken,
    mut signals: Option<&mut SignalSession>,
) -> CheckergenResult<DisplayStats> {
    let fps = project.fps();
    let bg = project.bg();
    project.reset_phases();

    let mut frame = FrameRGB::new(project.res(), bg);
    let mut ticker = FrameTicker::new(fps);
    let mut stats = DisplayStats::default();

    tracing::info!(boards = project.boards().len(), "display started");
    send_signal(&mut signals, Signal::GroupStart);

    let result = (|| -> CheckergenResult<()> {
        while !cancel.is_cancelled() && !presenter.close_requested() {
            let interval = if opts.pace {
                ticker.tick()
            } else {
                ticker.mark()
            };
            if let Some(dt) = interval {
                stats.intervals.push(dt);
            }
            frame.clear(bg);
            for board in project.boards_mut() {
                board.anim(&mut frame, None, fps);
            }
            presenter.present(&frame)?;
            stats.frames += 1;
        }
        Ok(())
    })();

    send_signal(&mut signals, Signal::GroupStop);
    tracing::info!(frames = stats.frames, "display stopped");

    // Intervals gathered before a failed present are still written.
    if let Some(path) = &opts.log_path {
        match write_interval_log(path, &stats.intervals) {
            Ok(()) => tracing::info!(path = %path.display(), "wrote frame interval log"),
            Err(e) if result.is_err() => {
                tracing::warn!(error = %e, "writing frame interval log failed");
            }
            Err(e) => return Err(e),
        }
    }
    result?;
    Ok(stats)
}

fn send_signal(signals: &mut Option<&mut SignalSession>, signal: Signal) {
    if let Some(session) = signals.as_deref_mut()
        && let Err(e) = session.send(signal)
    {
        tracing::warn!(error = %e, ?signal, "signal send failed");
    }
}

fn write_interval_log(path: &std::path::Path, intervals: &[Duration]) -> CheckergenResult<()> {
    let file = File::create(path)
        .with_context(|| format!("create interval log '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    for dt in intervals {
        writeln!(out, "{:.3}", dt.as_secs_f64() * 1000.0)
            .with_context(|| format!("write interval log '{}'", path.display()))?;
    }
    out.flush()
        .with_context(|| format!("write interval log '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/display.rs"]
mod tests;
