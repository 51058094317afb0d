//! Composition left behind by fractional crystallization of a magma ocean
//! solidifying from the CMB upwards.

use crate::config::TracersIn;
use crate::geometry::RadiusBounds;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialProfile {
    bounds: RadiusBounds,
    /// Eutectic concentration.
    xieut: f64,
    /// Partition coefficient between solid and liquid.
    k: f64,
    /// Initial liquid concentration.
    xi0l: f64,
    xi0s: f64,
    rsup: f64,
}

impl InitialProfile {
    pub fn new(bounds: RadiusBounds, xieut: f64, k: f64, xi0l: f64) -> InitialProfile {
        let xi0s = k * xi0l;
        let xired = xi0l / xieut;
        let rsup = (bounds.r_max.powi(3)
            - xired.powf(1.0 / (1.0 - k)) * bounds.shell_volume_factor())
        .cbrt();
        info!(
            "theoretical profile: rmin={} rmax={} rsup={}",
            bounds.r_min, bounds.r_max, rsup
        );
        InitialProfile {
            bounds,
            xieut,
            k,
            xi0l,
            xi0s,
            rsup,
        }
    }

    pub fn from_tracers(bounds: RadiusBounds, tracers: &TracersIn) -> InitialProfile {
        InitialProfile::new(bounds, tracers.fe_eut, tracers.k_fe, tracers.fe_cont)
    }

    /// Radius above which the remaining liquid sits at the eutectic.
    pub fn rsup(&self) -> f64 {
        self.rsup
    }

    pub fn eutectic(&self) -> f64 {
        self.xieut
    }

    /// Liquid fraction left when the crystallization front reaches `r`, raised
    /// to `k - 1`.
    fn enrichment(&self, r: f64) -> f64 {
        let b = &self.bounds;
        (b.shell_volume_factor() / (b.r_max.powi(3) - r.powi(3))).powf(1.0 - self.k)
    }

    /// Solid concentration crystallized at radius `r`.
    ///
    /// Jumps from `k * xieut` to `xieut` at `rsup`; this is the plotted profile.
    pub fn solid(&self, r: f64) -> f64 {
        if r < self.rsup {
            self.xi0s * self.enrichment(r)
        } else {
            self.xieut
        }
    }

    /// Concentration of the liquid in contact with the front at `r`.
    pub fn liquid(&self, r: f64) -> f64 {
        if r < self.rsup {
            self.xi0l * self.enrichment(r)
        } else {
            self.xieut
        }
    }
}
