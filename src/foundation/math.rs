use rust_decimal::prelude::ToPrimitive as _;
use rust_decimal::{Decimal, RoundingStrategy};

/// Greatest common divisor (Euclid).
pub(crate) fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b > 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Lowest common multiple, `None` on overflow.
pub(crate) fn lcm(a: u128, b: u128) -> Option<u128> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Number of decimal digits needed to print `x`.
pub(crate) fn num_digits(mut x: u64) -> usize {
    let mut n = 1;
    while x >= 10 {
        x /= 10;
        n += 1;
    }
    n
}

/// Split a non-negative decimal into an unreduced `(numerator, denominator)` pair.
pub(crate) fn decimal_fraction(d: Decimal) -> Option<(u128, u128)> {
    let num = u128::try_from(d.mantissa()).ok()?;
    let den = 10u128.checked_pow(d.scale())?;
    Some((num, den))
}

/// Reduce `num/den` to lowest terms.
pub(crate) fn reduce(num: u128, den: u128) -> (u128, u128) {
    let g = gcd(num, den).max(1);
    (num / g, den / g)
}

/// Round to the nearest whole pixel, halves away from zero.
pub(crate) fn round_px(d: Decimal) -> i64 {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(if d.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
}

/// Euclidean remainder for decimals, result in `[0, m)` for positive `m`.
pub(crate) fn rem_euclid(d: Decimal, m: Decimal) -> Decimal {
    let r = d % m;
    if r.is_sign_negative() && !r.is_zero() {
        r + m
    } else {
        r
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
