use crate::board::checkerboard::{BoardEdit, CheckerBoard};
use crate::foundation::core::{Fps, Resolution, Rgb8};
use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::render::format::ImageFormat;

/// Name given to projects created without one.
pub const DEFAULT_NAME: &str = "untitled";

/// A set of boards plus display-wide settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    /// Project name, also the stem of its file and of exported images.
    #[serde(skip)]
    pub(crate) name: String,
    pub(crate) fps: Fps,
    pub(crate) res: Resolution,
    pub(crate) bg: Rgb8,
    pub(crate) export_fmt: ImageFormat,
    pub(crate) boards: Vec<CheckerBoard>,
    #[serde(skip)]
    pub(crate) dirty: bool,
}

/// Partial update of project settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsEdit {
    /// New project name.
    pub name: Option<String>,
    /// New frame rate.
    pub fps: Option<Fps>,
    /// New resolution.
    pub res: Option<Resolution>,
    /// New background color.
    pub bg: Option<Rgb8>,
    /// New default export format.
    pub export_fmt: Option<ImageFormat>,
}

impl SettingsEdit {
    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of a batch operation over board ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Ids the operation was applied to.
    pub applied: Vec<usize>,
    /// Ids that did not name a board.
    pub missing: Vec<usize>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl Project {
    /// Create an empty project with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: if name.trim().is_empty() {
                DEFAULT_NAME.to_owned()
            } else {
                name
            },
            fps: Fps::default(),
            res: Resolution::default(),
            bg: Rgb8::GRAY,
            export_fmt: ImageFormat::default(),
            boards: Vec::new(),
            dirty: true,
        }
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Frame rate used by every session over this project.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Surface size.
    pub fn res(&self) -> Resolution {
        self.res
    }

    /// Background color.
    pub fn bg(&self) -> Rgb8 {
        self.bg
    }

    /// Default export format.
    pub fn export_fmt(&self) -> ImageFormat {
        self.export_fmt
    }

    /// Boards in drawing order.
    pub fn boards(&self) -> &[CheckerBoard] {
        &self.boards
    }

    /// Mutable access to the boards for rendering sessions.
    pub fn boards_mut(&mut self) -> &mut [CheckerBoard] {
        &mut self.boards
    }

    /// `true` when the project changed since it was last saved or loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set or clear the unsaved-changes marker.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Apply a settings update.
    pub fn apply_settings(&mut self, edit: SettingsEdit) -> CheckergenResult<()> {
        if edit.is_empty() {
            return Err(CheckergenError::validation(
                "no options specified, please specify at least one",
            ));
        }
        if let Some(name) = edit.name {
            if name.trim().is_empty() {
                return Err(CheckergenError::validation("project name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(v) = edit.fps {
            self.fps = v;
        }
        if let Some(v) = edit.res {
            self.res = v;
        }
        if let Some(v) = edit.bg {
            self.bg = v;
        }
        if let Some(v) = edit.export_fmt {
            self.export_fmt = v;
        }
        self.dirty = true;
        Ok(())
    }

    /// Append a board, returning its id.
    pub fn add_board(&mut self, board: CheckerBoard) -> usize {
        self.boards.push(board);
        self.dirty = true;
        self.boards.len() - 1
    }

    /// Apply `edit` to every board named in `ids`.
    ///
    /// Unknown ids are reported and skipped; the remaining boards are still edited. A field that
    /// fails validation aborts the whole batch before any board is touched.
    pub fn edit_boards(&mut self, ids: &[usize], edit: &BoardEdit) -> CheckergenResult<EditReport> {
        if edit.is_empty() {
            return Err(CheckergenError::validation(
                "no options specified, please specify at least one",
            ));
        }
        let report = self.split_ids(ids);
        if report.applied.is_empty() {
            return Ok(report);
        }

        // Validate once against a scratch copy so a bad field leaves every board untouched.
        let mut probe = self.boards[report.applied[0]].clone();
        probe.apply(edit)?;

        for &id in &report.applied {
            self.boards[id].apply(edit)?;
        }
        self.dirty = true;
        Ok(report)
    }

    /// Remove the boards named in `ids`; ids refer to positions before the removal.
    pub fn remove_boards(&mut self, ids: &[usize]) -> EditReport {
        let report = self.split_ids(ids);
        let mut doomed = report.applied.clone();
        doomed.sort_unstable();
        doomed.dedup();
        for id in doomed.into_iter().rev() {
            self.boards.remove(id);
        }
        if !report.applied.is_empty() {
            self.dirty = true;
        }
        report
    }

    /// Remove every board.
    pub fn clear_boards(&mut self) {
        self.boards.clear();
        self.dirty = true;
    }

    /// Reset every board to its initial phase.
    pub fn reset_phases(&mut self) {
        for board in &mut self.boards {
            board.reset(None);
        }
    }

    /// Independent deep copy for a rendering session.
    pub fn snapshot(&self) -> Project {
        self.clone()
    }

    fn split_ids(&self, ids: &[usize]) -> EditReport {
        let mut report = EditReport::default();
        for &id in ids {
            if id < self.boards.len() {
                report.applied.push(id);
            } else {
                report.missing.push(id);
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
