use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::board::anchor::Anchor;
use crate::board::checkerboard::{BoardEdit, BoardParams};
use crate::foundation::core::{Fps, Resolution, Rgb8};
use crate::project::model::SettingsEdit;
use crate::render::format::ImageFormat;

/// One line typed at the shell prompt.
///
/// The first word names the command, the way a multicall binary picks its applet.
#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
pub(crate) struct ShellLine {
    #[command(subcommand)]
    pub(crate) cmd: ShellCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ShellCommand {
    /// Create a new project with the given name (may contain whitespace).
    New {
        name: Vec<String>,
    },
    /// Open a project file.
    Open {
        path: PathBuf,
    },
    /// Close the current project, asking to save first.
    Close,
    /// Save the current project to a file or directory (default: working directory).
    Save {
        path: Option<PathBuf>,
    },
    /// Set project settings.
    Set(SetArgs),
    /// Make a new checkerboard.
    Mk(MkArgs),
    /// Edit checkerboards by id.
    Ed(EdArgs),
    /// Remove checkerboards by id.
    Rm {
        /// Ids of checkerboards to remove.
        ids: Vec<usize>,
        /// Remove all checkerboards.
        #[arg(short, long)]
        all: bool,
    },
    /// List project settings and checkerboards.
    Ls {
        /// Ids of checkerboards to list, all when omitted.
        ids: Vec<usize>,
        /// List only settings.
        #[arg(short, long, conflicts_with = "boards")]
        settings: bool,
        /// List only checkerboards.
        #[arg(short, long)]
        boards: bool,
    },
    /// Display the animation in a window (ESC to quit).
    Display {
        /// Fullscreen mode.
        #[arg(short, long)]
        fullscreen: bool,
        /// Log frame intervals to `{name}.log`.
        #[arg(long)]
        logtime: bool,
    },
    /// Export the animation as an image sequence.
    Export {
        /// Destination directory.
        dir: PathBuf,
        /// Image format for export.
        #[arg(long)]
        fmt: Option<ImageFormat>,
        /// Do not create a project-named folder.
        #[arg(short = 'n', long)]
        nofolder: bool,
        /// Export even when the frame count exceeds the limit.
        #[arg(long)]
        force: bool,
    },
    /// Quit, asking to save first.
    #[command(alias = "exit")]
    Quit,
    /// List commands, or show help for one.
    Help {
        topic: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct SetArgs {
    /// Project name, also the file name without extension.
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Frames rendered per second, e.g. `60`, `59.94` or `30000/1001`.
    #[arg(long)]
    pub(crate) fps: Option<Fps>,
    /// Canvas size in pixels.
    #[arg(long, value_name = "WIDTH,HEIGHT", value_parser = parse_resolution)]
    pub(crate) res: Option<Resolution>,
    /// Background color (R,G,B, R;G;B, #RRGGBB or a name).
    #[arg(long, value_name = "COLOR")]
    pub(crate) bg: Option<Rgb8>,
    /// Default export image format.
    #[arg(long)]
    pub(crate) fmt: Option<ImageFormat>,
}

impl From<SetArgs> for SettingsEdit {
    fn from(a: SetArgs) -> Self {
        SettingsEdit {
            name: a.name,
            fps: a.fps,
            res: a.res,
            bg: a.bg,
            export_fmt: a.fmt,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct MkArgs {
    /// Columns,rows in cells.
    #[arg(value_name = "DIMS", value_parser = parse_dims)]
    pub(crate) dims: [u32; 2],
    /// Width,height of the initial cell in pixels.
    #[arg(value_name = "INIT_UNIT", value_parser = parse_decimal_pair)]
    pub(crate) init_unit: [Decimal; 2],
    /// Width,height of the final cell in pixels.
    #[arg(value_name = "END_UNIT", value_parser = parse_decimal_pair)]
    pub(crate) end_unit: [Decimal; 2],
    /// X,y position of the origin in pixels.
    #[arg(value_name = "POSITION", value_parser = parse_decimal_pair)]
    pub(crate) position: [Decimal; 2],
    /// Origin point (topleft, topright, btmleft, btmright, topcenter, btmcenter, centerleft,
    /// centerright, center).
    pub(crate) origin: Anchor,
    /// Color1,color2 (each R;G;B, #RRGGBB or a name).
    #[arg(value_name = "COLS", value_parser = parse_colors)]
    pub(crate) cols: [Rgb8; 2],
    /// Color reversal frequency in Hz.
    pub(crate) freq: Decimal,
    /// Initial phase in degrees.
    #[arg(default_value = "0")]
    pub(crate) phase: Decimal,
}

impl From<MkArgs> for BoardParams {
    fn from(a: MkArgs) -> Self {
        BoardParams {
            dims: a.dims,
            init_unit: a.init_unit,
            end_unit: a.end_unit,
            position: a.position,
            origin: a.origin,
            cols: a.cols,
            freq: a.freq,
            phase: a.phase,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct EdArgs {
    /// Ids of checkerboards to edit.
    #[arg(required = true, value_name = "ID")]
    pub(crate) ids: Vec<usize>,
    /// Columns,rows in cells.
    #[arg(long, value_name = "C,R", value_parser = parse_dims)]
    pub(crate) dims: Option<[u32; 2]>,
    /// Width,height of the initial cell.
    #[arg(long = "init_unit", value_name = "W,H", value_parser = parse_decimal_pair)]
    pub(crate) init_unit: Option<[Decimal; 2]>,
    /// Width,height of the final cell.
    #[arg(long = "end_unit", value_name = "W,H", value_parser = parse_decimal_pair)]
    pub(crate) end_unit: Option<[Decimal; 2]>,
    /// X,y position of the origin.
    #[arg(long, value_name = "X,Y", value_parser = parse_decimal_pair)]
    pub(crate) position: Option<[Decimal; 2]>,
    /// Origin point.
    #[arg(long)]
    pub(crate) origin: Option<Anchor>,
    /// Color1,color2.
    #[arg(long, value_name = "COLOR1,COLOR2", value_parser = parse_colors)]
    pub(crate) cols: Option<[Rgb8; 2]>,
    /// Color reversal frequency in Hz.
    #[arg(long)]
    pub(crate) freq: Option<Decimal>,
    /// Initial phase in degrees.
    #[arg(long)]
    pub(crate) phase: Option<Decimal>,
}

impl EdArgs {
    pub(crate) fn edit(&self) -> BoardEdit {
        BoardEdit {
            dims: self.dims,
            init_unit: self.init_unit,
            end_unit: self.end_unit,
            position: self.position,
            origin: self.origin,
            cols: self.cols,
            freq: self.freq,
            phase: self.phase,
        }
    }
}

fn parse_pair<T: FromStr>(s: &str, what: &str) -> Result<[T; 2], String> {
    let bad = || format!("expected {what} as two comma-separated values, got \"{s}\"");
    let (a, b) = s.split_once(',').ok_or_else(bad)?;
    let a = a.trim().parse().map_err(|_| bad())?;
    let b = b.trim().parse().map_err(|_| bad())?;
    Ok([a, b])
}

pub(crate) fn parse_dims(s: &str) -> Result<[u32; 2], String> {
    parse_pair(s, "whole numbers")
}

pub(crate) fn parse_decimal_pair(s: &str) -> Result<[Decimal; 2], String> {
    parse_pair(s, "numbers")
}

pub(crate) fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let [w, h] = parse_pair(s, "width and height")?;
    Resolution::new(w, h).map_err(|e| e.to_string())
}

/// Two colors separated by a comma; channel lists inside each color use `;`.
pub(crate) fn parse_colors(s: &str) -> Result<[Rgb8; 2], String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated colors, got \"{s}\""))?;
    let a = a.parse::<Rgb8>().map_err(|e| e.to_string())?;
    let b = b.parse::<Rgb8>().map_err(|e| e.to_string())?;
    Ok([a, b])
}

#[cfg(test)]
#[path = "../../tests/unit/shell/commands.rs"]
mod tests;
