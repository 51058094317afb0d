use crate::config::RunParams;

/// Radial extent of the convecting shell in non-dimensional units.
///
/// Heights in the profile table are measured from the CMB, so a radius is
/// `height + r_cmb`. Cartesian runs have `r_cmb == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusBounds {
    pub r_min: f64,
    pub r_max: f64,
    pub r_cmb: f64,
}

impl RadiusBounds {
    pub fn new(r_cmb: f64) -> RadiusBounds {
        RadiusBounds {
            r_min: r_cmb,
            r_max: r_cmb + 1.0,
            r_cmb,
        }
    }

    pub fn from_params(params: &RunParams) -> RadiusBounds {
        if params.geometry.is_spherical() {
            RadiusBounds::new(params.geometry.r_cmb)
        } else {
            RadiusBounds::new(0.0)
        }
    }

    pub fn radius(&self, height: f64) -> f64 {
        height + self.r_cmb
    }

    /// Radius reached by material at `r` after a full volume-preserving overturn.
    pub fn overturned(&self, r: f64) -> f64 {
        (self.r_max.powi(3) + self.r_min.powi(3) - r.powi(3)).cbrt()
    }

    /// `(r / r_max)²`: horizontal surface scaling of a per-unit-surface quantity.
    pub fn surface_weight(&self, r: f64) -> f64 {
        (r / self.r_max).powi(2)
    }

    pub fn shell_volume_factor(&self) -> f64 {
        self.r_max.powi(3) - self.r_min.powi(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cartesian_runs_ignore_r_cmb() {
        let params = RunParams::default();
        let bounds = RadiusBounds::from_params(&params);
        assert_eq!(bounds, RadiusBounds::new(0.0));
        assert_eq!(bounds.r_max, 1.0);
    }

    #[test]
    fn spherical_runs_offset_by_r_cmb() {
        let mut params = RunParams::default();
        params.geometry.shape = "spherical".into();
        params.geometry.r_cmb = 1.19;
        let bounds = RadiusBounds::from_params(&params);
        assert_abs_diff_eq!(bounds.r_max, 2.19, epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.radius(0.5), 1.69, epsilon = 1e-12);
    }

    #[test]
    fn overturn_swaps_the_shell_ends_and_is_an_involution() {
        let bounds = RadiusBounds::new(1.19);
        assert_abs_diff_eq!(bounds.overturned(bounds.r_min), bounds.r_max, epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.overturned(bounds.r_max), bounds.r_min, epsilon = 1e-12);
        let r = 1.7;
        assert_abs_diff_eq!(bounds.overturned(bounds.overturned(r)), r, epsilon = 1e-12);
    }

    #[test]
    fn surface_weight_is_one_at_the_top() {
        let bounds = RadiusBounds::new(0.55);
        assert_eq!(bounds.surface_weight(bounds.r_max), 1.0);
        assert_abs_diff_eq!(bounds.surface_weight(0.775), 0.25, epsilon = 1e-12);
    }
}
