//! Checkergen generates flashing checkerboard stimuli for psychophysics experiments.
//!
//! A [`Project`] holds display settings and a list of [`CheckerBoard`]s. Each board is a grid
//! whose cell sizes follow a linear gradient away from an [`Anchor`] and whose two colors
//! reverse at a fixed frequency. Projects are:
//!
//! - played on screen with [`run_display`] (or through a [`SessionRegistry`] worker)
//! - exported as numbered still images with [`export_project`]
//! - edited interactively through the [`Shell`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod board;
pub(crate) mod project;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod shell;
/// Trigger codes for external recording equipment.
pub mod signal;

pub use crate::foundation::core::{Fps, FrameIndex, Resolution, Rgb8};
pub use crate::foundation::error::{CheckergenError, CheckergenResult};

pub use crate::board::anchor::Anchor;
pub use crate::board::checkerboard::{BoardEdit, BoardParams, Cell, CheckerBoard};
pub use crate::board::gradient::unit_gradient;
pub use crate::board::phase::PhaseClock;
pub use crate::project::model::{DEFAULT_NAME, EditReport, Project, SettingsEdit};
pub use crate::project::store::CKG_EXT;
pub use crate::render::format::ImageFormat;
pub use crate::render::surface::{FrameRGB, PixelRect, RecordingSurface, Surface};
pub use crate::session::display::{
    CancelToken, CapturePresenter, DisplayOpts, DisplayStats, FrameTicker, Presenter, run_display,
};
pub use crate::session::export::{
    ExportOpts, ExportPlan, ExportStats, MAX_EXPORT_FRAMES, MAX_EXPORT_FRAMES_ENV,
    export_project, export_project_with, loop_frames, max_export_frames, plan_export, run_export,
};
pub use crate::session::sink::{FrameSink, ImageSequenceSink, InMemorySink, SinkConfig};
#[cfg(feature = "window")]
pub use crate::session::window::WindowPresenter;
pub use crate::session::worker::{PresenterFactory, SessionHandle, SessionRegistry};
pub use crate::shell::{PROMPT, PresenterSource, Shell};
pub use crate::signal::SignalPorts;
