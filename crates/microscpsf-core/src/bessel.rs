//! Bessel functions of the first kind and the Lommel integral.
//!
//! The reconstruction step needs the overlap of two order-zero Bessel
//! functions of different scale over the pupil,
//!
//! $$
//! R(s, b) = \int_0^{\rho_m} J_0(s\rho)\, J_0(b\rho)\, \rho \, d\rho
//!   = \rho_m \frac{s J_1(s\rho_m) J_0(b\rho_m) - b J_0(s\rho_m) J_1(b\rho_m)}{s^2 - b^2},
//! $$
//!
//! which has the finite limit
//! $\tfrac{1}{2}\rho_m^2 \left[J_0(s\rho_m)^2 + J_1(s\rho_m)^2\right]$ as $b \to s$.

/// Relative distance between `s` and `b` below which the Lommel integral
/// switches to its analytic limit.
///
/// Closer than this, cancellation in the numerator costs more accuracy than
/// the first-order error of the limit formula.
pub const COINCIDENCE_TOLERANCE: f64 = 1e-8;

/// Order-zero Bessel function of the first kind, $J_0(x)$.
#[inline]
pub fn j0(x: f64) -> f64 {
    libm::j0(x)
}

/// Order-one Bessel function of the first kind, $J_1(x)$.
#[inline]
pub fn j1(x: f64) -> f64 {
    libm::j1(x)
}

/// Whether `s` and `b` are close enough for the analytic limit.
#[inline]
pub fn is_coincident(s: f64, b: f64) -> bool {
    (s - b).abs() <= COINCIDENCE_TOLERANCE * s.abs().max(b.abs()).max(1.0)
}

/// Closed-form $\int_0^{\rho_m} J_0(s\rho) J_0(b\rho) \rho\, d\rho$.
///
/// When `s` and `b` coincide (see [`is_coincident`]) the limit
/// $\tfrac{1}{2}\rho_m^2 [J_0(s\rho_m)^2 + J_1(s\rho_m)^2]$ is returned instead
/// of dividing by a vanishing denominator.
pub fn lommel_integral(s: f64, b: f64, max_rho: f64) -> f64 {
    if is_coincident(s, b) {
        let x = 0.5 * (s + b) * max_rho;
        let (j0x, j1x) = (j0(x), j1(x));
        return 0.5 * max_rho * max_rho * (j0x * j0x + j1x * j1x);
    }

    let (sr, br) = (s * max_rho, b * max_rho);
    let numerator = s * j1(sr) * j0(br) * max_rho - b * j0(sr) * j1(br) * max_rho;
    numerator / (s * s - b * b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Composite Simpson reference for the overlap integral.
    fn simpson_overlap(s: f64, b: f64, max_rho: f64) -> f64 {
        let n = 20_000;
        let h = max_rho / n as f64;
        let f = |x: f64| j0(s * x) * j0(b * x) * x;
        let mut acc = f(0.0) + f(max_rho);
        for i in 1..n {
            let w = if i % 2 == 1 { 4.0 } else { 2.0 };
            acc += w * f(i as f64 * h);
        }
        acc * h / 3.0
    }

    #[test]
    fn test_known_values() {
        assert_eq!(j0(0.0), 1.0);
        assert_eq!(j1(0.0), 0.0);
        // First zero of J0 and a tabulated J1 value.
        assert_abs_diff_eq!(j0(2.404_825_557_695_773), 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(j1(1.0), 0.440_050_585_744_933_5, epsilon = 1e-14);
    }

    #[test]
    fn test_lommel_matches_quadrature() {
        for &(s, b) in &[(1.0, 3.0), (12.5, 4.2), (80.0, 0.0), (3.7, 3.9)] {
            let closed = lommel_integral(s, b, 0.95);
            let numeric = simpson_overlap(s, b, 0.95);
            assert_abs_diff_eq!(closed, numeric, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_coincident_arguments_use_limit() {
        let s = 7.25;
        assert!(is_coincident(s, s));
        let at = lommel_integral(s, s, 0.95);
        assert!(at.is_finite());
        assert_abs_diff_eq!(at, simpson_overlap(s, s, 0.95), epsilon = 1e-10);
    }

    #[test]
    fn test_limit_is_continuous() {
        let s = 21.0;
        let exact = lommel_integral(s, s, 1.0);
        let near = lommel_integral(s, s * (1.0 + 1e-6), 1.0);
        assert!(!is_coincident(s, s * (1.0 + 1e-6)));
        assert_abs_diff_eq!(exact, near, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_radius_reduces_to_single_bessel() {
        // b = 0: R = rho_m J1(s rho_m) / s
        let (s, m) = (5.0, 0.8);
        assert_abs_diff_eq!(lommel_integral(s, 0.0, m), m * j1(s * m) / s, epsilon = 1e-15);
    }
}
