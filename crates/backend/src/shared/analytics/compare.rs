/// Signed change of `current` relative to `previous`, in percent, rounded to
/// two decimals.
///
/// * equal values give `0`
/// * a drop to zero gives `100` (not `-100`)
/// * growth from a zero base is undefined and gives `None`
pub fn percentage_delta(current: f64, previous: f64) -> Option<f64> {
    if current == previous {
        return Some(0.0);
    }
    if current == 0.0 {
        return Some(100.0);
    }
    if previous == 0.0 {
        return None;
    }
    Some(round2((current - previous) / previous * 100.0))
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator * 100 / denominator`, `None` for an empty denominator.
pub fn ratio_percent(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(round2(numerator as f64 * 100.0 / denominator as f64))
    }
}
