use rust_decimal::Decimal;

use crate::board::anchor::Anchor;
use crate::board::gradient::unit_gradient;
use crate::board::phase::PhaseClock;
use crate::foundation::core::{Fps, Rgb8};
use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::foundation::math::round_px;
use crate::render::surface::{PixelRect, Surface};

/// Full parameter set of a board, as entered by the user and stored in project files.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoardParams {
    /// `(columns, rows)` in cells.
    pub dims: [u32; 2],
    /// Cell `(width, height)` at the anchor edge (or center), in pixels.
    pub init_unit: [Decimal; 2],
    /// Cell `(width, height)` at the far edge(s), in pixels.
    pub end_unit: [Decimal; 2],
    /// Anchor point `(x, y)` in surface pixels.
    pub position: [Decimal; 2],
    /// Which point of the grid sits on `position`.
    pub origin: Anchor,
    /// The two cell colors.
    pub cols: [Rgb8; 2],
    /// Color reversal frequency in Hz, `0` for a static board.
    pub freq: Decimal,
    /// Initial phase in degrees.
    #[serde(default)]
    pub phase: Decimal,
}

/// Partial update of a board, one optional field per mutable attribute.
///
/// Every present field is validated before any of them is applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardEdit {
    /// New grid size.
    pub dims: Option<[u32; 2]>,
    /// New initial cell size.
    pub init_unit: Option<[Decimal; 2]>,
    /// New final cell size.
    pub end_unit: Option<[Decimal; 2]>,
    /// New anchor position.
    pub position: Option<[Decimal; 2]>,
    /// New anchor.
    pub origin: Option<Anchor>,
    /// New colors.
    pub cols: Option<[Rgb8; 2]>,
    /// New reversal frequency.
    pub freq: Option<Decimal>,
    /// New initial phase.
    pub phase: Option<Decimal>,
}

impl BoardEdit {
    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `true` when applying this edit changes the unit gradient inputs.
    pub fn touches_geometry(&self) -> bool {
        self.dims.is_some()
            || self.init_unit.is_some()
            || self.end_unit.is_some()
            || self.origin.is_some()
    }
}

/// One cell of a rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Column index.
    pub col: u32,
    /// Row index.
    pub row: u32,
    /// Rounded rectangle to fill.
    pub rect: PixelRect,
    /// Fill color for the current phase.
    pub color: Rgb8,
}

/// A checkerboard whose cell sizes follow a linear gradient and whose colors reverse
/// periodically.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "BoardParams", into = "BoardParams")]
pub struct CheckerBoard {
    params: BoardParams,
    unit_grad: [Decimal; 2],
    clock: PhaseClock,
}

impl CheckerBoard {
    /// Build a board from a complete parameter set.
    pub fn new(params: BoardParams) -> CheckergenResult<Self> {
        validate_dims(params.dims)?;
        validate_unit("init_unit", params.init_unit)?;
        validate_unit("end_unit", params.end_unit)?;
        validate_freq(params.freq)?;

        let unit_grad = unit_gradient(
            params.dims,
            params.init_unit,
            params.end_unit,
            params.origin,
        );
        let clock = PhaseClock::new(params.phase);
        Ok(Self {
            params,
            unit_grad,
            clock,
        })
    }

    /// Current parameters.
    pub fn params(&self) -> &BoardParams {
        &self.params
    }

    /// Grid size in cells.
    pub fn dims(&self) -> [u32; 2] {
        self.params.dims
    }

    /// Anchor of the grid.
    pub fn origin(&self) -> Anchor {
        self.params.origin
    }

    /// Reversal frequency in Hz.
    pub fn freq(&self) -> Decimal {
        self.params.freq
    }

    /// Initial phase in degrees.
    pub fn phase(&self) -> Decimal {
        self.params.phase
    }

    /// Per-axis size increment between neighbouring cells.
    pub fn unit_grad(&self) -> [Decimal; 2] {
        self.unit_grad
    }

    /// Live phase in degrees, in `[0, 360)`.
    pub fn cur_phase(&self) -> Decimal {
        self.clock.cur_phase()
    }

    /// `true` when the colors are drawn in reversed order this frame.
    pub fn is_swapped(&self) -> bool {
        self.clock.is_swapped()
    }

    /// Apply a partial update. On error nothing is changed.
    pub fn apply(&mut self, edit: &BoardEdit) -> CheckergenResult<()> {
        if let Some(dims) = edit.dims {
            validate_dims(dims)?;
        }
        if let Some(u) = edit.init_unit {
            validate_unit("init_unit", u)?;
        }
        if let Some(u) = edit.end_unit {
            validate_unit("end_unit", u)?;
        }
        if let Some(freq) = edit.freq {
            validate_freq(freq)?;
        }

        let p = &mut self.params;
        if let Some(v) = edit.dims {
            p.dims = v;
        }
        if let Some(v) = edit.init_unit {
            p.init_unit = v;
        }
        if let Some(v) = edit.end_unit {
            p.end_unit = v;
        }
        if let Some(v) = edit.position {
            p.position = v;
        }
        if let Some(v) = edit.origin {
            p.origin = v;
        }
        if let Some(v) = edit.cols {
            p.cols = v;
        }
        if let Some(v) = edit.freq {
            p.freq = v;
        }
        if let Some(v) = edit.phase {
            p.phase = v;
        }

        if edit.touches_geometry() {
            self.unit_grad = unit_gradient(p.dims, p.init_unit, p.end_unit, p.origin);
        }
        Ok(())
    }

    /// Move the live phase back to the initial phase, or to `to` when given.
    pub fn reset(&mut self, to: Option<Decimal>) {
        self.clock.reset(to.unwrap_or(self.params.phase));
    }

    /// Advance the phase clock by one frame at `fps`.
    pub fn advance(&mut self, fps: Fps) {
        self.clock.advance(fps, self.params.freq);
    }

    /// Fill every cell of the current frame into `surface`.
    ///
    /// `at` overrides the stored anchor position for this frame only.
    pub fn render(&self, surface: &mut dyn Surface, at: Option<[Decimal; 2]>) {
        surface.begin_batch();
        self.for_each_cell(at, |cell| surface.fill_rect(cell.rect, cell.color));
        surface.end_batch();
    }

    /// One animation tick: render the current frame, then advance the clock.
    pub fn anim(&mut self, surface: &mut dyn Surface, at: Option<[Decimal; 2]>, fps: Fps) {
        self.render(surface, at);
        self.advance(fps);
    }

    /// Cells of the current frame in drawing order (rows, then columns).
    pub fn cells(&self, at: Option<[Decimal; 2]>) -> Vec<Cell> {
        let [cols, rows] = self.params.dims;
        let mut out = Vec::with_capacity((cols as usize) * (rows as usize));
        self.for_each_cell(at, |cell| out.push(cell));
        out
    }

    fn for_each_cell(&self, at: Option<[Decimal; 2]>, mut f: impl FnMut(Cell)) {
        let p = &self.params;
        let flags = p.origin.flags();
        let grad = self.unit_grad;

        // Running sizes start half a step in so each cell gets the size at its own center.
        // A centered axis starts at the far edge and shrinks toward the middle.
        let mut seed_unit = [Decimal::ZERO; 2];
        let mut seed_pos = at.unwrap_or(p.position);
        for n in 0..2 {
            if flags[n] == 0 {
                seed_unit[n] = p.end_unit[n] - grad[n] / Decimal::TWO;
                seed_pos[n] -= (p.init_unit[n] + p.end_unit[n]) / Decimal::TWO
                    * Decimal::from(p.dims[n])
                    / Decimal::TWO;
            } else {
                seed_unit[n] = p.init_unit[n] + grad[n] / Decimal::TWO;
            }
        }

        let [even, odd] = if self.clock.is_swapped() {
            [p.cols[1], p.cols[0]]
        } else {
            p.cols
        };

        let mut unit = seed_unit;
        let mut pos = seed_pos;
        for row in 0..p.dims[1] {
            for col in 0..p.dims[0] {
                let mut corner = pos;
                for n in 0..2 {
                    // Far-corner anchors grow away from the anchor.
                    if flags[n] < 0 {
                        corner[n] -= unit[n];
                    }
                }
                f(Cell {
                    col,
                    row,
                    rect: PixelRect::new(
                        round_px(corner[0]),
                        round_px(corner[1]),
                        round_px(unit[0]),
                        round_px(unit[1]),
                    ),
                    color: if (col + row) % 2 == 0 { even } else { odd },
                });
                self.step(0, col, &mut pos, &mut unit);
            }
            pos[0] = seed_pos[0];
            unit[0] = seed_unit[0];
            self.step(1, row, &mut pos, &mut unit);
        }
    }

    fn step(&self, axis: usize, idx: u32, pos: &mut [Decimal; 2], unit: &mut [Decimal; 2]) {
        let flag = self.params.origin.flags()[axis];
        let grad = self.unit_grad[axis];
        if flag == 0 {
            pos[axis] += unit[axis];
            let next = Decimal::from(idx + 1);
            let half = Decimal::from(self.params.dims[axis]) / Decimal::TWO;
            if next < half {
                unit[axis] -= grad;
            } else if next > half {
                unit[axis] += grad;
            }
        } else {
            pos[axis] += Decimal::from(flag) * unit[axis];
            unit[axis] += grad;
        }
    }
}

impl TryFrom<BoardParams> for CheckerBoard {
    type Error = CheckergenError;

    fn try_from(params: BoardParams) -> Result<Self, Self::Error> {
        Self::new(params)
    }
}

impl From<CheckerBoard> for BoardParams {
    fn from(board: CheckerBoard) -> Self {
        board.params
    }
}

fn validate_dims(dims: [u32; 2]) -> CheckergenResult<()> {
    if dims.contains(&0) {
        return Err(CheckergenError::invalid_config(
            "dims must be at least one cell on each axis",
        ));
    }
    Ok(())
}

fn validate_unit(what: &str, unit: [Decimal; 2]) -> CheckergenResult<()> {
    if unit.iter().any(|u| *u <= Decimal::ZERO) {
        return Err(CheckergenError::invalid_config(format!(
            "{what} must be > 0 on each axis"
        )));
    }
    Ok(())
}

fn validate_freq(freq: Decimal) -> CheckergenResult<()> {
    if freq.is_sign_negative() && !freq.is_zero() {
        return Err(CheckergenError::invalid_config("freq must be >= 0"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/board/checkerboard.rs"]
mod tests;
