use rust_decimal::Decimal;

use crate::board::anchor::Anchor;

/// Per-axis pixel increment applied from one cell to the next.
///
/// A centered axis interpolates from `init_unit` at the middle out to `end_unit` at both edges,
/// so it covers the same size change in half the cells and the step is doubled.
pub fn unit_gradient(
    dims: [u32; 2],
    init_unit: [Decimal; 2],
    end_unit: [Decimal; 2],
    origin: Anchor,
) -> [Decimal; 2] {
    let flags = origin.flags();
    std::array::from_fn(|n| {
        let k = if flags[n] == 0 {
            Decimal::TWO
        } else {
            Decimal::ONE
        };
        k * (end_unit[n] - init_unit[n]) / Decimal::from(dims[n])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/board/gradient.rs"]
mod tests;
