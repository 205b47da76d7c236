// src/utils/score.rs

/// Rounds a percentage to two decimal places, matching the precision every
/// score and metrics endpoint reports.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(100.0 / 3.0), 33.33);
        assert_eq!(round2(200.0 / 3.0), 66.67);
        assert_eq!(round2(60.0), 60.0);
        assert_eq!(round2(0.0), 0.0);
    }
}
