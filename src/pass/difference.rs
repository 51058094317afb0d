//! Convergence towards the overturned initial state: how far the temperature
//! and concentration profiles are from their overturned first profile, and
//! how fast the vertical velocity grows while they get there.

use super::{ProfileOp, ProfileOpHandle, ProfilePass};
use crate::constants::{
    GROWTH_RATE_LAG, STATMIN_FIELD_WIDTH, STATMIN_FILE, STATMIN_PRECISION,
};
use crate::error::RprofError;
use crate::plot::{
    Axis, Figure, LegendPos, LineStyle, Panel, Rgb, Series, format_time_label, python_sci,
};
use std::io::{self, Write};
use tracing::{info, warn};

/// One value per selected timestep, pushed by the profile ops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DifferenceSeries {
    /// Volumetric norm of concentration minus its overturned first profile.
    pub concentration: Vec<f64>,
    /// Same for temperature.
    pub temperature: Vec<f64>,
    /// Maximum vertical velocity.
    pub wmax: Vec<f64>,
}

fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

/// Exponential growth rate of `wmax`, from the first sample and the sample
/// `GROWTH_RATE_LAG` steps before the maximum:
/// `σ = ln(w[i-3] / w[0]) / t[i-3]`.
///
/// NaN when the maximum comes too early for the lag.
pub fn growth_rate(wmax: &[f64], times: &[f64]) -> f64 {
    match argmax(wmax) {
        Some(i) if i >= GROWTH_RATE_LAG && i - GROWTH_RATE_LAG < times.len() => {
            let j = i - GROWTH_RATE_LAG;
            (wmax[j] / wmax[0]).ln() / times[j]
        }
        _ => f64::NAN,
    }
}

/// The values written to `statmin.dat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatminRow {
    pub rcmb: f64,
    pub k_fe: f64,
    pub ra: f64,
    /// Time of the smallest temperature difference.
    pub tmin_t: f64,
    pub sigma: f64,
    /// Time of the smallest concentration difference.
    pub tmin_c: f64,
}

impl StatminRow {
    const HEADER: [&'static str; 6] = ["rcmb", "k_fe", "ra", "tminT", "sigma", "tminC"];

    fn values(&self) -> [f64; 6] {
        [self.rcmb, self.k_fe, self.ra, self.tmin_t, self.sigma, self.tmin_c]
    }
}

/// Header names left-aligned and values right-aligned, in fixed-width fields.
pub fn write_statmin<W: Write>(out: &mut W, row: &StatminRow) -> io::Result<()> {
    for name in StatminRow::HEADER {
        write!(out, "{:<width$}", name, width = STATMIN_FIELD_WIDTH)?;
    }
    writeln!(out)?;
    for value in row.values() {
        write!(
            out,
            "{:>width$}",
            python_sci(value, STATMIN_PRECISION),
            width = STATMIN_FIELD_WIDTH
        )?;
    }
    writeln!(out)
}

/// Draws the difference time series and writes the summary table once the
/// temperature and concentration ops have filled [`DifferenceSeries`].
pub struct DifferenceSummaryOp;

impl DifferenceSummaryOp {
    pub fn handle() -> ProfileOpHandle {
        ProfileOpHandle::new(Box::new(DifferenceSummaryOp))
    }
}

/// Ratio of `values` to their first element against time, with the minimum
/// marked.
fn ratio_panel(label: &str, times: &[f64], values: &[f64], imin: usize, width: u32) -> Panel {
    let ratio: Vec<f64> = values.iter().map(|v| v / values[0]).collect();
    let mut panel = Panel::new(Axis::new(""), Axis::new(label).log());
    panel.push(Series::from_xy(times, &ratio, Rgb::BLUE, width));
    panel.push(
        Series::new(vec![(times[imin], ratio[imin])], Rgb::ORANGE, width)
            .styled(LineStyle::Markers)
            .labelled(format_time_label(times[imin])),
    );
    panel
}

impl ProfileOp for DifferenceSummaryOp {
    fn name(&self) -> &str {
        "Difference summary"
    }

    fn after_pass(&mut self, pass: &mut ProfilePass) -> Result<(), RprofError> {
        let times = pass.step_times();
        let series = &pass.difference;
        let n = times.len();
        if series.concentration.len() != n || series.temperature.len() != n || series.wmax.len() != n {
            warn!(
                "difference series incomplete ({} concentration, {} temperature, {} velocity values for {} timesteps), skipping summary",
                series.concentration.len(),
                series.temperature.len(),
                series.wmax.len(),
                n
            );
            return Ok(());
        }
        let (Some(iminc), Some(imint), Some(iwm)) = (
            argmin(&series.concentration),
            argmin(&series.temperature),
            argmax(&series.wmax),
        ) else {
            return Ok(());
        };

        let width = pass.options.linewidth;
        let sigma = growth_rate(&series.wmax, &times);
        info!("growth rate of the vertical velocity: {}", sigma);

        let mut composition = ratio_panel(
            "Composition diff.",
            &times,
            &series.concentration,
            iminc,
            width,
        );
        composition.legend = LegendPos::UpperRight;
        let mut temperature =
            ratio_panel("Temperature diff.", &times, &series.temperature, imint, width);
        temperature.legend = LegendPos::LowerRight;

        let mut velocity = Panel::new(Axis::new("Time"), Axis::new("Max. rms vert. velocity").log());
        velocity.push(Series::from_xy(&times, &series.wmax, Rgb::BLUE, width));
        let fit_end = (iwm + 2).min(n);
        let fit: Vec<(f64, f64)> = times[..fit_end]
            .iter()
            .map(|&t| (t, series.wmax[0] * (sigma * t).exp()))
            .collect();
        velocity.push(
            Series::new(fit, Rgb::BLUE, width)
                .styled(LineStyle::Dashed)
                .labelled(format!("sigma={}", python_sci(sigma, 2))),
        );

        let row = StatminRow {
            rcmb: pass.bounds.r_cmb,
            k_fe: pass.params.tracersin.k_fe,
            ra: pass.params.refstate.ra0,
            tmin_t: times[imint],
            sigma,
            tmin_c: times[iminc],
        };

        let stem = format!("Difference_to_overturned{}", pass.window.tag());
        let figure = Figure::new(
            stem,
            vec![composition, temperature, velocity],
            pass.options.fontsize,
        );
        pass.save(&figure)?;

        let mut table = Vec::new();
        write_statmin(&mut table, &row).map_err(|e| RprofError::io(STATMIN_FILE, e))?;
        pass.save_text(STATMIN_FILE, &String::from_utf8_lossy(&table))
    }
}
