//! Per-timestep radial profiles of one quantity, drawn into a single figure.
//!
//! Each selected timestep adds its profile (and min/max companions) in the
//! timestep's colour. Temperature and concentration can carry their
//! overturned first profile, the concentration figure the theoretical
//! crystallization profile, and in difference mode both feed
//! [`DifferenceSeries`](super::DifferenceSeries).

use super::{ProfileOp, ProfileOpHandle, ProfilePass};
use crate::constants::{
    ADVECTION_COLUMNS, COL_HEIGHT, COL_MAX_VERTICAL_VELOCITY, RADIUS_MARGIN, THEORY_SAMPLES,
};
use crate::energy::EnergyBalance;
use crate::error::RprofError;
use crate::math_utils::{extrap, linspace, normprof};
use crate::plot::{Axis, Figure, LineStyle, Panel, Rgb, Series, format_time_label};
use crate::quantity::{QuantityDescriptor, QuantityKind};
use crate::theory::InitialProfile;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSource {
    Columns,
    Energy,
}

pub struct ProfilePlotOp {
    kind: Option<QuantityKind>,
    desc: QuantityDescriptor,
    source: ProfileSource,
    /// Scale by `(r / r_max)²` before plotting.
    integrate: bool,
    theory: Option<InitialProfile>,
    panel: Panel,
    /// First profile interpolated on the overturned radii.
    reference: Option<Vec<f64>>,
    x_range: Option<(f64, f64)>,
}

impl ProfilePlotOp {
    fn new(
        kind: Option<QuantityKind>,
        desc: QuantityDescriptor,
        source: ProfileSource,
        integrate: bool,
    ) -> Self {
        Self {
            kind,
            desc,
            source,
            integrate,
            theory: None,
            panel: Panel::default(),
            reference: None,
            x_range: None,
        }
    }

    /// Profiles of a tabulated quantity, with its min/max columns when asked.
    pub fn quantity(
        kind: QuantityKind,
        min_max: bool,
        theory: Option<InitialProfile>,
    ) -> ProfileOpHandle {
        let mut op = Self::new(
            Some(kind),
            QuantityDescriptor::for_kind(kind, min_max),
            ProfileSource::Columns,
            false,
        );
        op.theory = theory;
        ProfileOpHandle::new(Box::new(op))
    }

    /// Vertical advection per unit surface, or scaled to the full sphere.
    pub fn advection(scaled: bool) -> ProfileOpHandle {
        let name = if scaled {
            "Total scaled advection"
        } else {
            "Advection per unit surface"
        };
        let desc = QuantityDescriptor::new(
            &[name, "Total", "down-welling", "Up-welling"],
            &ADVECTION_COLUMNS,
        );
        ProfileOpHandle::new(Box::new(Self::new(
            None,
            desc,
            ProfileSource::Columns,
            scaled,
        )))
    }

    pub fn energy() -> ProfileOpHandle {
        let desc = QuantityDescriptor::new(
            &["Energy", "Total", "Advection", "conduction"],
            &ADVECTION_COLUMNS,
        );
        ProfileOpHandle::new(Box::new(Self::new(
            None,
            desc,
            ProfileSource::Energy,
            true,
        )))
    }

    fn is(&self, kind: QuantityKind) -> bool {
        self.kind == Some(kind)
    }

    /// Radii and raw profiles of the current timestep.
    fn read_step(&self, pass: &ProfilePass) -> (Vec<f64>, Vec<Vec<f64>>) {
        let rows = pass.cursor.rows;
        let table = &pass.data.table;
        match self.source {
            ProfileSource::Energy => {
                let energy = EnergyBalance::compute(table, rows);
                let radius = energy.height.iter().map(|&h| pass.bounds.radius(h)).collect();
                let profiles = energy.profiles().iter().map(|p| p.to_vec()).collect();
                (radius, profiles)
            }
            ProfileSource::Columns => {
                let range = rows.profile_range();
                let radius = table
                    .column(COL_HEIGHT, range.clone())
                    .into_iter()
                    .map(|h| pass.bounds.radius(h))
                    .collect();
                let profiles = self
                    .desc
                    .columns
                    .iter()
                    .map(|&col| table.column(col, range.clone()))
                    .collect();
                (radius, profiles)
            }
        }
    }

    fn overlay_overturned(
        &mut self,
        pass: &ProfilePass,
        radius: &[f64],
        profile: &[f64],
        plotted: &[f64],
        color: Rgb,
    ) {
        let rfin: Vec<f64> = radius.iter().map(|&r| pass.bounds.overturned(r)).collect();
        self.reference = Some(extrap(&rfin, radius, profile));
        self.panel.push(
            Series::from_xy(plotted, &rfin, color, pass.options.linewidth)
                .styled(LineStyle::Dashed)
                .labelled("Overturned"),
        );
    }

    fn overlay_theory(
        &mut self,
        pass: &ProfilePass,
        theory: &InitialProfile,
        radius: &[f64],
        plotted: &[f64],
    ) {
        let width = pass.options.linewidth;
        let radii = linspace(pass.bounds.r_min, pass.bounds.r_max, THEORY_SAMPLES);
        let cinit: Vec<f64> = radii.iter().map(|&r| theory.solid(r)).collect();
        let rfin: Vec<f64> = radii.iter().map(|&r| pass.bounds.overturned(r)).collect();

        self.panel.push(
            Series::from_xy(&cinit, &radii, Rgb::RED, width)
                .styled(LineStyle::Dashed)
                .labelled("Theoretical"),
        );
        self.panel.push(
            Series::from_xy(&cinit, &rfin, Rgb::RED, width)
                .styled(LineStyle::DashDot)
                .labelled("Overturned"),
        );

        if let (Some(&first), Some(&last)) = (plotted.first(), plotted.last()) {
            let ends = vec![(first, radius[0]), (last, radius[radius.len() - 1])];
            self.panel.push(
                Series::new(ends, Rgb::ORANGE, width)
                    .styled(LineStyle::Markers)
                    .labelled("StagYY profile ends"),
            );
            self.x_range = Some((0.9 * first, 1.2 * last));
        }
    }

    fn track_difference(&self, pass: &mut ProfilePass, radius: &[f64], profile: &[f64]) {
        let Some(reference) = &self.reference else {
            return;
        };
        let diff: Vec<f64> = profile.iter().zip(reference).map(|(p, r)| p - r).collect();
        let norm = normprof(radius, &diff);
        if self.is(QuantityKind::Concentration) {
            pass.difference.concentration.push(norm);
        } else if self.is(QuantityKind::Temperature) {
            pass.difference.temperature.push(norm);
            let wmax = pass
                .data
                .table
                .column(COL_MAX_VERTICAL_VELOCITY, pass.cursor.rows.profile_range())
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max);
            pass.difference.wmax.push(wmax);
        }
    }

    /// Black legend-only entries naming the companion line styles.
    fn companion_legend(&mut self, width: u32) {
        for i in 0..self.desc.columns.len() {
            if let Some(label) = self.desc.column_label(i) {
                let entry = Series::new(Vec::new(), Rgb::BLACK, width)
                    .styled(LineStyle::nth(i))
                    .labelled(label);
                self.panel.push(entry);
            }
        }
    }
}

impl ProfileOp for ProfilePlotOp {
    fn name(&self) -> &str {
        self.desc.name()
    }

    fn init_pass(&mut self, pass: &mut ProfilePass) -> Result<(), RprofError> {
        let mut x = Axis::new(self.desc.name());
        if self.kind.is_some_and(|k| k.log_scale()) {
            x = x.log();
        }
        let y = Axis::new("z").with_range(
            pass.bounds.r_min - RADIUS_MARGIN,
            pass.bounds.r_max + RADIUS_MARGIN,
        );
        self.panel = Panel::new(x, y);
        self.reference = None;
        self.x_range = None;
        if self.source == ProfileSource::Columns
            && self.desc.columns.iter().any(|&c| c >= pass.data.table.n_cols())
        {
            warn!(
                "{}: profile table has {} columns, missing values plot as gaps",
                self.desc.name(),
                pass.data.table.n_cols()
            );
        }
        Ok(())
    }

    fn update_step(&mut self, pass: &mut ProfilePass) -> Result<(), RprofError> {
        let (radius, profiles) = self.read_step(pass);
        let color = pass.color();
        let width = pass.options.linewidth;
        let first_step = pass.is_first_step();
        let difference = pass.options.plot_difference;

        for (i, profile) in profiles.iter().enumerate() {
            let plotted: Vec<f64> = if self.integrate {
                profile
                    .iter()
                    .zip(&radius)
                    .map(|(&f, &r)| f * pass.bounds.surface_weight(r))
                    .collect()
            } else {
                profile.clone()
            };

            if i > 0 {
                self.panel.push(
                    Series::from_xy(&plotted, &radius, color, width).styled(LineStyle::nth(i)),
                );
                continue;
            }

            self.panel.push(
                Series::from_xy(&plotted, &radius, color, width)
                    .labelled(format_time_label(pass.cursor.time)),
            );

            let overturnable =
                self.is(QuantityKind::Temperature) || self.is(QuantityKind::Concentration);
            if overturnable && first_step && (pass.options.plot_overturn_init || difference) {
                self.overlay_overturned(pass, &radius, profile, &plotted, color);
            }
            if difference {
                self.track_difference(pass, &radius, profile);
            }
            if first_step && self.is(QuantityKind::Concentration) {
                if let Some(theory) = self.theory {
                    self.overlay_theory(pass, &theory, &radius, &plotted);
                }
            }
        }

        let legend = self.desc.has_companions() && !self.is(QuantityKind::Viscosity);
        if legend && pass.is_last_step() {
            self.companion_legend(width);
        }
        Ok(())
    }

    fn after_pass(&mut self, pass: &mut ProfilePass) -> Result<(), RprofError> {
        let mut panel = std::mem::take(&mut self.panel);
        if let Some((lo, hi)) = self.x_range {
            panel.x = panel.x.with_range(lo, hi);
        }
        let stem = pass.ranged_stem(&self.desc.file_stem());
        let figure = Figure::single(stem, panel, pass.options.fontsize);
        pass.save(&figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlotOptions, RunParams, TimestepWindow};
    use crate::constants::{COL_CONCENTRATION, COL_TEMPERATURE, COL_VISCOSITY};
    use crate::geometry::RadiusBounds;
    use crate::pass::PassProps;
    use crate::plot::{MemoryWriter, Scale};
    use crate::rprof::test_util::synthetic;
    use approx::assert_abs_diff_eq;
    use more_asserts::assert_gt;

    fn column_value(step: usize, height: f64, col: usize) -> f64 {
        match col {
            COL_TEMPERATURE => 1.0 - height,
            COL_CONCENTRATION => 0.1 + 0.5 * height + 0.01 * step as f64,
            COL_VISCOSITY => 10f64.powf(3.0 * height),
            _ => 2.0,
        }
    }

    fn pass_with(
        ops: Vec<ProfileOpHandle>,
        options: PlotOptions,
        params: RunParams,
        steps: usize,
    ) -> (ProfilePass, MemoryWriter) {
        let writer = MemoryWriter::new("out");
        let mut pass = ProfilePass::new(PassProps {
            data: synthetic(&vec![21; steps], 64, column_value),
            params,
            options,
            writer: Box::new(writer.clone()),
            ops,
        })
        .unwrap();
        pass.run().unwrap();
        (pass, writer)
    }

    fn spherical() -> RunParams {
        RunParams::from_json_str(r#"{"geometry": {"shape": "spherical", "r_cmb": 1.19}}"#)
            .unwrap()
    }

    #[test]
    fn min_max_companions_share_the_step_colour() {
        let options = PlotOptions {
            timestep: Some(TimestepWindow::new(0, 3, 2)),
            ..PlotOptions::default()
        };
        let (pass, writer) = pass_with(
            vec![ProfilePlotOp::quantity(QuantityKind::Temperature, true, None)],
            options,
            RunParams::default(),
            3,
        );
        let figure = writer.find("Temperature_0_2_2").unwrap();
        let panel = &figure.panels[0];

        // two steps of three profiles, then three legend entries
        assert_eq!(panel.series.len(), 9);
        assert_eq!(panel.series[1].color, panel.series[0].color);
        assert_eq!(panel.series[2].style, LineStyle::DashDot);
        assert_eq!(panel.series[3].color, pass.colors[1]);
        let legend: Vec<_> = panel
            .labelled_series()
            .filter_map(|s| s.label.as_deref())
            .collect();
        assert_eq!(legend, vec!["t=0.00×10^0", "t=2.00×10^-3", "Mean", "Minimum", "Maximum"]);
        let (lo, hi) = panel.y.range.unwrap();
        assert_abs_diff_eq!(lo, -0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(hi, 1.05, epsilon = 1e-12);
    }

    #[test]
    fn viscosity_uses_a_log_axis_without_companion_legend() {
        let (_, writer) = pass_with(
            vec![ProfilePlotOp::quantity(QuantityKind::Viscosity, true, None)],
            PlotOptions::default(),
            RunParams::default(),
            2,
        );
        let panel = &writer.find("Viscosity_0_1_1").unwrap().panels[0];
        assert_eq!(panel.x.scale, Scale::Log);
        assert_eq!(panel.series.len(), 6);
    }

    #[test]
    fn overturned_profile_and_theory_on_first_step() {
        let options = PlotOptions {
            plot_concentration: true,
            plot_overturn_init: true,
            ..PlotOptions::default()
        };
        let params = spherical();
        let bounds = RadiusBounds::from_params(&params);
        let theory = InitialProfile::new(bounds, 0.8, 0.5, 0.4);
        let (_, writer) = pass_with(
            vec![ProfilePlotOp::quantity(QuantityKind::Concentration, false, Some(theory))],
            options,
            params,
            2,
        );
        let panel = &writer.find("Concentration_0_1_1").unwrap().panels[0];
        let labels: Vec<_> = panel
            .labelled_series()
            .filter_map(|s| s.label.as_deref())
            .collect();
        assert_eq!(
            labels,
            vec![
                "t=0.00×10^0",
                "Overturned",
                "Theoretical",
                "Overturned",
                "StagYY profile ends",
                "t=1.00×10^-3"
            ]
        );

        // the overturn flips the radii of the first profile
        let overturned = &panel.series[1];
        assert_abs_diff_eq!(overturned.points[0].1, bounds.r_max, epsilon = 1e-9);
        assert_eq!(panel.series[2].points.len(), THEORY_SAMPLES);
        assert_eq!(panel.series[2].color, Rgb::RED);

        let ends = &panel.series[4];
        assert_eq!(ends.style, LineStyle::Markers);
        assert_abs_diff_eq!(ends.points[0].0, 0.1, epsilon = 1e-12);
        let (lo, hi) = panel.x.range.unwrap();
        assert_abs_diff_eq!(lo, 0.09, epsilon = 1e-12);
        // last plotted level sits at height 0.95
        assert_abs_diff_eq!(hi, 1.2 * 0.575, epsilon = 1e-12);
    }

    #[test]
    fn difference_norms_track_the_overturned_reference() {
        let options = PlotOptions {
            plot_concentration: true,
            plot_conctheo: true,
            plot_difference: true,
            ..PlotOptions::default()
        };
        let (pass, _) = pass_with(
            vec![
                ProfilePlotOp::quantity(QuantityKind::Temperature, false, None),
                ProfilePlotOp::quantity(QuantityKind::Concentration, false, None),
            ],
            options,
            RunParams::default(),
            3,
        );
        let series = &pass.difference;
        assert_eq!(series.temperature.len(), 3);
        assert_eq!(series.wmax, vec![2.0; 3]);
        assert_gt!(series.concentration[0], 0.0);
        // steady temperature, drifting concentration
        assert_eq!(series.temperature[0], series.temperature[2]);
        assert_ne!(series.concentration[0], series.concentration[2]);
    }

    #[test]
    fn scaled_advection_weights_by_surface() {
        let params = spherical();
        let bounds = RadiusBounds::from_params(&params);
        let (_, writer) = pass_with(
            vec![ProfilePlotOp::advection(false), ProfilePlotOp::advection(true)],
            PlotOptions::default(),
            params,
            1,
        );
        assert_eq!(
            writer.stems(),
            vec!["Advection_per_unit_surface_0_0_1", "Total_scaled_advection_0_0_1"]
        );
        let plain = &writer.find("Advection_per_unit_surface_0_0_1").unwrap().panels[0];
        let scaled = &writer.find("Total_scaled_advection_0_0_1").unwrap().panels[0];
        let (x, r) = plain.series[0].points[0];
        assert_abs_diff_eq!(x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r, bounds.r_min, epsilon = 1e-12);
        assert_abs_diff_eq!(
            scaled.series[0].points[0].0,
            2.0 * bounds.surface_weight(bounds.r_min),
            epsilon = 1e-12
        );
        assert_eq!(plain.series.len(), 6);
    }

    #[test]
    fn energy_profiles_span_the_whole_step() {
        let (_, writer) = pass_with(
            vec![ProfilePlotOp::energy()],
            PlotOptions::default(),
            RunParams::default(),
            1,
        );
        let panel = &writer.find("Energy_0_0_1").unwrap().panels[0];
        assert_eq!(panel.series[0].points.len(), 21);
        assert_eq!(panel.series[0].points[20].1, 1.0);
    }
}
