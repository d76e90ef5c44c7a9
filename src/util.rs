/// Round `x` to its leading significant digit (`1234 → 1000`, `-0.0047 → -0.005`).
///
/// Halves round to even (`2.5 → 2`, `35 → 40`). Subnormal inputs, whose
/// decimal scale is not representable, are returned unchanged.
pub fn round_to_first(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let digits = -(x.abs().log10().floor() as i32);
    if digits >= 0 {
        let scale = 10f64.powi(digits);
        if !scale.is_finite() {
            return x;
        }
        (x * scale).round_ties_even() / scale
    } else {
        let scale = 10f64.powi(-digits);
        (x / scale).round_ties_even() * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stays_zero() {
        assert_eq!(round_to_first(0.0), 0.0);
    }

    #[test]
    fn rounds_large_and_small() {
        assert_eq!(round_to_first(1234.0), 1000.0);
        assert_eq!(round_to_first(-0.0047), -0.005);
        assert_eq!(round_to_first(0.27), 0.3);
        assert_eq!(round_to_first(96.0), 100.0);
        assert_eq!(round_to_first(7.0), 7.0);
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(round_to_first(2.5), 2.0);
        assert_eq!(round_to_first(3.5), 4.0);
        assert_eq!(round_to_first(-2.5), -2.0);
        assert_eq!(round_to_first(250.0), 200.0);
    }

    #[test]
    fn subnormal_input_stays_finite() {
        let tiny = 5e-324;
        assert_eq!(round_to_first(tiny), tiny);
        let small = f64::MIN_POSITIVE / 1e3;
        assert!(round_to_first(small).is_finite());
    }
}
