use rust_decimal::Decimal;

use crate::foundation::core::Fps;
use crate::foundation::math::rem_euclid;

const FULL_TURN: Decimal = Decimal::from_parts(360, 0, 0, false, 0);
const HALF_TURN: Decimal = Decimal::from_parts(180, 0, 0, false, 0);

/// Color-reversal clock of one board.
///
/// The clock counts frames since its last rebase point and recomputes the phase from that count
/// on every tick, so long runs never accumulate rounding error. It rebases whenever the offset
/// lands on a whole number of turns, which keeps the counter bounded by one reversal period.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseClock {
    base: Decimal,
    frames: u64,
    rate: Option<(Fps, Decimal)>,
    cur: Decimal,
}

impl PhaseClock {
    /// Create a clock positioned at `phase` degrees.
    pub fn new(phase: Decimal) -> Self {
        let cur = rem_euclid(phase, FULL_TURN);
        Self {
            base: cur,
            frames: 0,
            rate: None,
            cur,
        }
    }

    /// Jump to `to` degrees (wrapped into `[0, 360)`).
    pub fn reset(&mut self, to: Decimal) {
        *self = Self::new(to);
    }

    /// Advance by one frame at `fps` for a board reversing at `freq` Hz.
    ///
    /// A zero frequency leaves the clock untouched.
    pub fn advance(&mut self, fps: Fps, freq: Decimal) {
        if freq.is_zero() {
            return;
        }
        if self.rate != Some((fps, freq)) {
            self.rebase();
            self.rate = Some((fps, freq));
        }
        self.frames += 1;

        // 360 * frames * freq / fps, with fps = num/den.
        let offset = Decimal::from(self.frames)
            .checked_mul(FULL_TURN)
            .and_then(|v| v.checked_mul(freq))
            .and_then(|v| v.checked_mul(Decimal::from(fps.den)))
            .and_then(|v| v.checked_div(Decimal::from(fps.num)));
        let Some(offset) = offset else {
            tracing::warn!(frames = self.frames, %freq, "phase offset overflowed, rebasing");
            self.rebase();
            return;
        };

        self.cur = rem_euclid(self.base + offset, FULL_TURN);
        if (offset % FULL_TURN).is_zero() {
            self.rebase();
        }
    }

    /// Current phase in degrees, always in `[0, 360)`.
    pub fn cur_phase(&self) -> Decimal {
        self.cur
    }

    /// `true` during the second half of the reversal cycle.
    pub fn is_swapped(&self) -> bool {
        self.cur >= HALF_TURN
    }

    fn rebase(&mut self) {
        self.base = self.cur;
        self.frames = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/board/phase.rs"]
mod tests;
