//! Numerical helpers shared by the profile post-processing: interpolation,
//! boundary extrapolation, trapezoidal integration and volumetric norms.

/// Assert that `actual` lies within `max_deviation` percent of `expected`.
///
/// Takes an optional trailing format message like `assert!`.
#[macro_export]
macro_rules! assert_deviation {
    ($actual:expr, $expected:expr, $max_deviation:expr) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::deviation(actual_val, expected_val);

            if actual_deviation >= max_dev {
                panic!(
                    "assertion failed: deviation {:.3}% >= {:.3}%\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, actual_val, expected_val
                );
            }
        }
    };
    ($actual:expr, $expected:expr, $max_deviation:expr, $($arg:tt)+) => {
        {
            let actual_val = $actual;
            let expected_val = $expected;
            let max_dev = $max_deviation;
            let actual_deviation = $crate::math_utils::deviation(actual_val, expected_val);

            if actual_deviation >= max_dev {
                panic!(
                    "assertion failed: deviation {:.3}% >= {:.3}%: {}\n  actual: {:?},\n  expected: {:?}",
                    actual_deviation, max_dev, format_args!($($arg)+), actual_val, expected_val
                );
            }
        }
    };
}

/// Linear interpolation between two values
///
/// # Examples
/// ```
/// use stag_rprof::math_utils::lerp;
///
/// assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
/// assert_eq!(lerp(100.0, 200.0, 0.25), 125.0);
/// ```
pub fn lerp(a: f64, b: f64, ratio: f64) -> f64 {
    a + (b - a) * ratio
}

/// Ratio that makes `lerp(a, b, ratio) == value`; 0 when `a == b`.
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if (b - a).abs() < f64::EPSILON {
        0.0
    } else {
        (value - a) / (b - a)
    }
}

/// Percentage deviation of `actual` from `expected`.
pub fn deviation(actual: f64, expected: f64) -> f64 {
    if expected.abs() < f64::EPSILON {
        if actual.abs() < f64::EPSILON {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        ((actual - expected).abs() / expected.abs()) * 100.0
    }
}

/// `n` evenly spaced samples from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| lerp(start, end, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

/// Piecewise-linear interpolation of one position, clamped to the end values
/// outside `[xpoints[0], xpoints[last]]`.
///
/// `xpoints` must be increasing and hold at least one sample.
pub fn interp(x: f64, xpoints: &[f64], ypoints: &[f64]) -> f64 {
    let n = xpoints.len().min(ypoints.len());
    if n == 1 || x <= xpoints[0] {
        return ypoints[0];
    }
    if x >= xpoints[n - 1] {
        return ypoints[n - 1];
    }
    let hi = xpoints[..n].partition_point(|&v| v <= x).clamp(1, n - 1);
    let lo = hi - 1;
    lerp(ypoints[lo], ypoints[hi], inverse_lerp(xpoints[lo], xpoints[hi], x))
}

/// Interpolation with linear extrapolation beyond both ends of the samples.
///
/// Below the first sample the slope of the first two samples is used, above the
/// last one the slope of the last two. Needs at least two samples.
///
/// # Examples
/// ```
/// use stag_rprof::math_utils::extrap;
///
/// let y = extrap(&[-1.0, 0.5, 3.0], &[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0]);
/// assert_eq!(y, vec![-2.0, 1.0, 6.0]);
/// ```
pub fn extrap(xpos: &[f64], xpoints: &[f64], ypoints: &[f64]) -> Vec<f64> {
    let n = xpoints.len().min(ypoints.len());
    let (x0, x1) = (xpoints[0], xpoints[1]);
    let (y0, y1) = (ypoints[0], ypoints[1]);
    let (xl, xp) = (xpoints[n - 1], xpoints[n - 2]);
    let (yl, yp) = (ypoints[n - 1], ypoints[n - 2]);

    xpos.iter()
        .map(|&x| {
            if x < x0 {
                y0 + (x - x0) * (y0 - y1) / (x0 - x1)
            } else if x > xl {
                yl + (x - xl) * (yl - yp) / (xl - xp)
            } else {
                interp(x, &xpoints[..n], &ypoints[..n])
            }
        })
        .collect()
}

/// Trapezoidal rule of `y` sampled at `x`.
pub fn trapz(y: &[f64], x: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (ys[0] + ys[1]) * (xs[1] - xs[0]))
        .sum()
}

/// Volumetric norm of a radial profile over a spherical shell:
/// `3 / (r_last³ - r_first³) * ∫ f² r² dr`.
///
/// A zero-thickness shell yields `inf` or `NaN`.
pub fn normprof(radius: &[f64], func: &[f64]) -> f64 {
    let (Some(&r_first), Some(&r_last)) = (radius.first(), radius.last()) else {
        return f64::NAN;
    };
    let integrand: Vec<f64> = func
        .iter()
        .zip(radius)
        .map(|(f, r)| f * f * r * r)
        .collect();
    3.0 / (r_last.powi(3) - r_first.powi(3)) * trapz(&integrand, &radius[..integrand.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(100.0, 200.0, 0.25), 125.0);
    }

    #[test]
    fn test_inverse_lerp() {
        assert_eq!(inverse_lerp(100.0, 200.0, 150.0), 0.5);
        assert_eq!(inverse_lerp(3.0, 3.0, 7.0), 0.0);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(2.0, 3.0, 0).is_empty());
    }

    #[test]
    fn interp_inside_and_clamped() {
        let x = [0.0, 1.0, 3.0];
        let y = [1.0, 3.0, 7.0];
        assert_abs_diff_eq!(interp(0.5, &x, &y), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(interp(2.0, &x, &y), 5.0, epsilon = 1e-12);
        assert_eq!(interp(1.0, &x, &y), 3.0);
        assert_eq!(interp(-4.0, &x, &y), 1.0);
        assert_eq!(interp(9.0, &x, &y), 7.0);
    }

    #[test]
    fn extrap_matches_interp_inside_range() {
        let x = [1.0, 1.2, 1.5, 2.0];
        let y = [0.3, 0.1, 0.4, 0.9];
        let pos = [1.0, 1.1, 1.35, 1.8, 2.0];
        let got = extrap(&pos, &x, &y);
        for (g, p) in got.iter().zip(pos) {
            assert_abs_diff_eq!(*g, interp(p, &x, &y), epsilon = 1e-12);
        }
    }

    #[test]
    fn extrap_follows_boundary_slopes() {
        let x = [1.0, 1.5, 2.0, 2.5];
        let y = [2.0, 3.0, 3.5, 5.0];
        let got = extrap(&[0.5, 3.0], &x, &y);
        // slope 2 below the range, slope 3 above it
        assert_abs_diff_eq!(got[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(got[1], 6.5, epsilon = 1e-12);
    }

    #[test]
    fn extrap_survives_unsorted_samples() {
        let got = extrap(&[0.0, 0.5, 5.0], &[2.0, 1.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn trapz_is_exact_for_linear_functions() {
        let x = linspace(0.0, 2.0, 7);
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0).collect();
        assert_abs_diff_eq!(trapz(&y, &x), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn normprof_of_constant_is_its_square() {
        for (r0, r1) in [(0.55, 1.55), (1.19, 2.19), (0.1, 0.3)] {
            let r = linspace(r0, r1, 4001);
            let f = vec![1.7; r.len()];
            assert_deviation!(normprof(&r, &f), 1.7 * 1.7, 1e-3, "shell {}..{}", r0, r1);
        }
    }

    #[test]
    fn normprof_of_flat_shell_is_not_finite() {
        let r = [1.0, 1.0, 1.0];
        assert!(!normprof(&r, &[1.0, 1.0, 1.0]).is_finite());
        assert!(normprof(&[], &[]).is_nan());
    }

    #[test]
    fn test_deviation() {
        assert_eq!(deviation(105.0, 100.0), 5.0);
        assert_eq!(deviation(0.0, 0.0), 0.0);
        assert_eq!(deviation(10.0, 0.0), f64::INFINITY);
    }

    #[test]
    #[should_panic(expected = "assertion failed: deviation")]
    fn test_assert_deviation_macro_fails() {
        assert_deviation!(120.0, 100.0, 10.0);
    }
}
