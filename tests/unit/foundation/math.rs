use super::*;

#[test]
fn lcm_of_frame_periods() {
    assert_eq!(lcm(10, 15), Some(30));
    assert_eq!(lcm(7, 1), Some(7));
    assert_eq!(lcm(u128::MAX, 2), None);
}

#[test]
fn num_digits_counts_zero_as_one() {
    assert_eq!(num_digits(0), 1);
    assert_eq!(num_digits(9), 1);
    assert_eq!(num_digits(10), 2);
    assert_eq!(num_digits(9999), 4);
}

#[test]
fn decimal_fraction_keeps_scale() {
    let d: Decimal = "2.50".parse().unwrap();
    assert_eq!(decimal_fraction(d), Some((250, 100)));
    assert_eq!(reduce(250, 100), (5, 2));
    assert_eq!(decimal_fraction(Decimal::from(-1)), None);
}

#[test]
fn round_px_rounds_halves_away_from_zero() {
    assert_eq!(round_px("2.5".parse().unwrap()), 3);
    assert_eq!(round_px("3.5".parse().unwrap()), 4);
    assert_eq!(round_px("-2.5".parse().unwrap()), -3);
    assert_eq!(round_px("7.49".parse().unwrap()), 7);
}

#[test]
fn rem_euclid_wraps_negative_phase() {
    let m = Decimal::from(360);
    assert_eq!(rem_euclid(Decimal::from(-90), m), Decimal::from(270));
    assert_eq!(rem_euclid(Decimal::from(720), m), Decimal::ZERO);
    assert_eq!(rem_euclid(Decimal::from(361), m), Decimal::ONE);
}
