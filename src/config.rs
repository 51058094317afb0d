//! Run parameters and plot selection.
//!
//! Run parameters mirror the sections of the StagYY parameter namelist that the
//! profile plots depend on. They are read from a JSON rendition of the
//! namelist; every field falls back to a default so partial files are fine.

use crate::constants::{DEFAULT_FONTSIZE, DEFAULT_LINEWIDTH};
use crate::error::RprofError;
use crate::quantity::QuantityKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub shape: String,
    pub r_cmb: f64,
    /// Dimensional thickness of the shell in meters.
    pub d_dimensional: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            shape: "cartesian".to_string(),
            r_cmb: 1.19,
            d_dimensional: 2890e3,
        }
    }
}

impl Geometry {
    pub fn is_spherical(&self) -> bool {
        self.shape.eq_ignore_ascii_case("spherical")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefState {
    pub ra0: f64,
}

impl Default for RefState {
    fn default() -> Self {
        Self { ra0: 1e7 }
    }
}

/// Composition of the crystallizing magma ocean and continental tracers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracersIn {
    pub fe_eut: f64,
    pub k_fe: f64,
    pub fe_cont: f64,
    pub d_archean: f64,
}

impl Default for TracersIn {
    fn default() -> Self {
        Self {
            fe_eut: 0.8,
            k_fe: 0.85,
            fe_cont: 0.1,
            d_archean: 0.05,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viscosity {
    pub eta_melt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Melt {
    pub solidus_function: String,
    pub tsol0: f64,
    #[serde(rename = "deltaTsol_water")]
    pub delta_tsol_water: f64,
    pub dtsol_dz: f64,
}

impl Default for Melt {
    fn default() -> Self {
        Self {
            solidus_function: "linear".to_string(),
            tsol0: 0.6,
            delta_tsol_water: 0.0,
            dtsol_dz: 0.0,
        }
    }
}

impl Melt {
    pub fn is_linear(&self) -> bool {
        self.solidus_function.eq_ignore_ascii_case("linear")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Switches {
    pub tracers: bool,
    pub cont_tracers: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Boundaries {
    pub air_layer: bool,
    pub air_thickness: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    pub geometry: Geometry,
    pub refstate: RefState,
    pub tracersin: TracersIn,
    pub viscosity: Viscosity,
    pub melt: Melt,
    pub switches: Switches,
    pub boundaries: Boundaries,
}

impl RunParams {
    pub fn from_json_str(json: &str) -> Result<Self, RprofError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RprofError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| RprofError::io(path, e))?;
        Self::from_json_str(&text)
    }
}

/// Output image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// Timestep selection `start:last:step` over 0-based timestep positions;
/// the plotted steps are `start + 1 ..= last` as 1-based ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestepWindow {
    pub start: usize,
    pub last: usize,
    pub step: usize,
}

impl TimestepWindow {
    pub fn new(start: usize, last: usize, step: usize) -> Self {
        Self {
            start,
            last,
            step: step.max(1),
        }
    }

    /// 1-based ordinals of the selected timesteps.
    pub fn ordinals(&self) -> impl Iterator<Item = usize> + use<> {
        (self.start + 1..=self.last).step_by(self.step)
    }

    pub fn len(&self) -> usize {
        self.ordinals().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tag appended to output file names, `"{start}_{last-1}_{step}"`.
    pub fn tag(&self) -> String {
        format!(
            "{}_{}_{}",
            self.start,
            self.last as i64 - 1,
            self.step
        )
    }

    pub fn validate(&self, available: usize) -> Result<(), RprofError> {
        if self.last > available || self.start >= self.last {
            return Err(RprofError::Window {
                start: self.start,
                last: self.last,
                step: self.step,
                available,
            });
        }
        Ok(())
    }
}

/// Which figures to draw and how.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub timestep: Option<TimestepWindow>,
    pub linewidth: u32,
    pub fontsize: u32,
    pub format: ImageFormat,
    pub outdir: PathBuf,
    pub plot_temperature: bool,
    pub plot_minmaxtemp: bool,
    pub plot_velocity: bool,
    pub plot_minmaxvelo: bool,
    pub plot_viscosity: bool,
    pub plot_minmaxvisco: bool,
    pub plot_concentration: bool,
    pub plot_minmaxcon: bool,
    pub plot_conctheo: bool,
    pub plot_overturn_init: bool,
    pub plot_difference: bool,
    pub plot_grid: bool,
    pub plot_grid_units: bool,
    pub plot_advection: bool,
    pub plot_energy: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            timestep: None,
            linewidth: DEFAULT_LINEWIDTH,
            fontsize: DEFAULT_FONTSIZE,
            format: ImageFormat::default(),
            outdir: PathBuf::from("."),
            plot_temperature: true,
            plot_minmaxtemp: false,
            plot_velocity: false,
            plot_minmaxvelo: false,
            plot_viscosity: false,
            plot_minmaxvisco: false,
            plot_concentration: false,
            plot_minmaxcon: false,
            plot_conctheo: false,
            plot_overturn_init: false,
            plot_difference: false,
            plot_grid: false,
            plot_grid_units: false,
            plot_advection: false,
            plot_energy: false,
        }
    }
}

impl PlotOptions {
    /// Difference tracking needs the theoretical composition and both the
    /// temperature and concentration passes; it is switched off otherwise.
    pub fn normalized(mut self) -> Self {
        if !(self.plot_conctheo && self.plot_temperature && self.plot_concentration) {
            self.plot_difference = false;
        }
        self
    }

    pub fn wants(&self, kind: QuantityKind) -> bool {
        match kind {
            QuantityKind::Temperature => self.plot_temperature,
            QuantityKind::VerticalVelocity | QuantityKind::HorizontalVelocity => {
                self.plot_velocity
            }
            QuantityKind::Viscosity => self.plot_viscosity,
            QuantityKind::Concentration => self.plot_concentration,
        }
    }

    pub fn wants_min_max(&self, kind: QuantityKind) -> bool {
        match kind {
            QuantityKind::Temperature => self.plot_minmaxtemp,
            QuantityKind::VerticalVelocity | QuantityKind::HorizontalVelocity => {
                self.plot_minmaxvelo
            }
            QuantityKind::Viscosity => self.plot_minmaxvisco,
            QuantityKind::Concentration => self.plot_minmaxcon,
        }
    }
}
