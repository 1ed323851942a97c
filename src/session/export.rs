use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::foundation::math::{decimal_fraction, lcm, num_digits, reduce};
use crate::project::model::Project;
use crate::render::format::ImageFormat;
use crate::render::surface::FrameRGB;
use crate::session::sink::{FrameSink, ImageSequenceSink, SinkConfig};

/// Default ceiling on the number of frames one export may write without confirmation.
pub const MAX_EXPORT_FRAMES: u64 = 10_000;

/// Environment variable overriding [`MAX_EXPORT_FRAMES`].
pub const MAX_EXPORT_FRAMES_ENV: &str = "CHECKERGEN_MAX_EXPORT_FRAMES";

const PROGRESS_EVERY: u64 = 250;

/// Effective export ceiling: the environment override when it is a positive integer, otherwise
/// [`MAX_EXPORT_FRAMES`].
pub fn max_export_frames() -> u64 {
    ceiling_from(std::env::var(MAX_EXPORT_FRAMES_ENV).ok().as_deref())
}

fn ceiling_from(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return MAX_EXPORT_FRAMES;
    };
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => n,
        _ => {
            tracing::warn!(
                value = %raw,
                "ignoring invalid {MAX_EXPORT_FRAMES_ENV}, using {MAX_EXPORT_FRAMES}"
            );
            MAX_EXPORT_FRAMES
        }
    }
}

/// Options for one export run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOpts {
    /// Existing directory to export into.
    pub dir: PathBuf,
    /// Image format, the project's default when `None`.
    pub format: Option<ImageFormat>,
    /// Write into a `{project-name}` subdirectory of `dir`.
    pub folder: bool,
    /// Allow frame counts above `max_frames` without asking.
    pub force: bool,
    /// Frames written for a project where every board is static.
    pub static_frames: u64,
    /// Frame ceiling.
    pub max_frames: u64,
}

impl ExportOpts {
    /// Defaults: project-named subfolder, no force, one frame for static projects.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: None,
            folder: true,
            force: false,
            static_frames: 1,
            max_frames: max_export_frames(),
        }
    }
}

/// Resolved export: everything needed to write frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPlan {
    /// Frames to write.
    pub frames: u64,
    /// Zero-padding width of the frame index in file names.
    pub digits: usize,
    /// Directory the images land in.
    pub out_dir: PathBuf,
    /// Image format.
    pub format: ImageFormat,
    /// Ceiling the plan was checked against.
    pub max_frames: u64,
}

impl ExportPlan {
    /// `true` when the plan writes more frames than the ceiling allows.
    pub fn exceeds_limit(&self) -> bool {
        self.frames > self.max_frames
    }
}

/// Summary of a finished export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames written.
    pub frames: u64,
    /// Directory the images were written to.
    pub out_dir: PathBuf,
    /// Wall-clock time spent rendering and writing.
    pub elapsed: Duration,
}

/// Smallest frame count after which every animated board is back at its starting phase.
///
/// Each board's period `fps / freq` is reduced to `a/b`; the loop spans `lcm(a)` frames.
/// Returns `None` when no board animates.
pub fn loop_frames(project: &Project) -> CheckergenResult<Option<u64>> {
    let fps = project.fps();
    let mut acc: Option<u128> = None;
    for board in project.boards() {
        let freq = board.freq();
        if freq.is_zero() {
            continue;
        }
        let (f_num, f_den) = decimal_fraction(freq.normalize()).ok_or_else(|| {
            CheckergenError::invalid_config(format!("freq {freq} cannot be exported"))
        })?;
        // fps / freq = (num / den) / (f_num / f_den)
        let (a, _) = reduce(
            u128::from(fps.num) * f_den,
            u128::from(fps.den) * f_num,
        );
        acc = Some(match acc {
            None => a,
            Some(prev) => lcm(prev, a).ok_or_else(|| {
                CheckergenError::invalid_config("export loop length overflows")
            })?,
        });
    }
    acc.map(|n| {
        u64::try_from(n).map_err(|_| CheckergenError::invalid_config("export loop length overflows"))
    })
    .transpose()
}

/// Work out frame count, target directory and format without touching the filesystem.
pub fn plan_export(project: &Project, opts: &ExportOpts) -> CheckergenResult<ExportPlan> {
    if !opts.dir.is_dir() {
        return Err(CheckergenError::invalid_config(format!(
            "export path '{}' is not a directory",
            opts.dir.display()
        )));
    }
    let frames = match loop_frames(project)? {
        Some(n) => n,
        None => opts.static_frames.max(1),
    };
    let out_dir = if opts.folder {
        opts.dir.join(project.name())
    } else {
        opts.dir.clone()
    };
    Ok(ExportPlan {
        frames,
        digits: num_digits(frames.saturating_sub(1)),
        out_dir,
        format: opts.format.unwrap_or(project.export_fmt()),
        max_frames: opts.max_frames,
    })
}

/// Render `frames` frames of `project` into `sink`, starting from every board's initial phase.
pub fn run_export(
    project: &mut Project,
    frames: u64,
    sink: &mut dyn FrameSink,
) -> CheckergenResult<()> {
    let res = project.res();
    let fps = project.fps();
    let bg = project.bg();
    project.reset_phases();

    sink.begin(SinkConfig {
        width: res.width,
        height: res.height,
        fps,
        frames,
    })?;

    let mut frame = FrameRGB::new(res, bg);
    for idx in 0..frames {
        frame.clear(bg);
        for board in project.boards_mut() {
            board.anim(&mut frame, None, fps);
        }
        sink.push_frame(FrameIndex(idx), &frame)?;
        if (idx + 1) % PROGRESS_EVERY == 0 {
            tracing::debug!(done = idx + 1, total = frames, "export progress");
        }
    }
    sink.end()
}

/// Export `project` as an image sequence, failing with [`CheckergenError::FrameOverflow`] when
/// the frame count exceeds the ceiling and `opts.force` is not set.
pub fn export_project(project: &Project, opts: &ExportOpts) -> CheckergenResult<ExportStats> {
    let plan = plan_export(project, opts)?;
    if plan.exceeds_limit() && !opts.force {
        return Err(CheckergenError::FrameOverflow {
            frames: plan.frames,
            max: plan.max_frames,
        });
    }
    write_plan(project, plan)
}

/// Export `project` as an image sequence, asking `confirm` when the frame count exceeds the
/// ceiling. Declining aborts with [`CheckergenError::ExportCancelled`] before anything is written.
///
/// The export runs on a private copy; `project` is left untouched.
pub fn export_project_with(
    project: &Project,
    opts: &ExportOpts,
    confirm: &mut dyn FnMut(&ExportPlan) -> bool,
) -> CheckergenResult<ExportStats> {
    let plan = plan_export(project, opts)?;
    if plan.exceeds_limit() && !opts.force && !confirm(&plan) {
        return Err(CheckergenError::ExportCancelled);
    }
    write_plan(project, plan)
}

#[tracing::instrument(skip_all, fields(project = %project.name(), frames = plan.frames))]
fn write_plan(project: &Project, plan: ExportPlan) -> CheckergenResult<ExportStats> {
    create_out_dir(&plan.out_dir)?;

    tracing::info!(
        frames = plan.frames,
        format = %plan.format,
        out_dir = %plan.out_dir.display(),
        "exporting"
    );
    let started = Instant::now();
    let mut copy = project.snapshot();
    let mut sink = ImageSequenceSink::new(plan.out_dir.clone(), project.name(), plan.format);
    run_export(&mut copy, plan.frames, &mut sink)?;
    let elapsed = started.elapsed();
    tracing::info!(frames = plan.frames, ?elapsed, "export done");

    Ok(ExportStats {
        frames: plan.frames,
        out_dir: plan.out_dir,
        elapsed,
    })
}

fn create_out_dir(dir: &Path) -> CheckergenResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create export directory '{}'", dir.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
