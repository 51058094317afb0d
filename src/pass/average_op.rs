use super::{ProfileOp, ProfileOpHandle, ProfilePass};
use crate::constants::{RADIUS_MARGIN, WATER_SOLIDUS_SHIFTS};
use crate::error::RprofError;
use crate::plot::{Axis, Figure, HLine, LegendPos, LineStyle, Panel, Rgb, Series};
use crate::quantity::{QuantityDescriptor, QuantityKind};
use crate::rprof::{AveragedProfiles, average_profiles};
use tracing::warn;

const AVERAGE_STYLES: [LineStyle; 4] = [
    LineStyle::Solid,
    LineStyle::Dashed,
    LineStyle::Dotted,
    LineStyle::Dotted,
];

/// Time average over every timestep in the file, drawn once the pass is over.
pub struct AveragedProfileOp {
    kind: QuantityKind,
    desc: QuantityDescriptor,
    name: String,
}

impl AveragedProfileOp {
    pub fn new(kind: QuantityKind, min_max: bool) -> Self {
        Self {
            kind,
            desc: QuantityDescriptor::for_kind(kind, min_max),
            name: format!("average {}", kind.name()),
        }
    }

    pub fn handle(kind: QuantityKind, min_max: bool) -> ProfileOpHandle {
        ProfileOpHandle::new(Box::new(Self::new(kind, min_max)))
    }

    /// Linear solidus, shifted by the water content of the tracers when they
    /// carry any.
    fn solidus(&self, pass: &ProfilePass, radius: &[f64], panel: &mut Panel) {
        let params = &pass.params;
        let melt = &params.melt;
        let width = pass.options.linewidth;
        let surface = pass.bounds.r_cmb + 1.0;
        let tsol: Vec<f64> = radius
            .iter()
            .map(|&r| melt.tsol0 + melt.dtsol_dz * (surface - r))
            .collect();

        panel.push(
            Series::from_xy(&tsol, radius, Rgb::BLACK, width)
                .styled(LineStyle::Dashed)
                .labelled("solidus"),
        );
        if params.switches.tracers {
            for ((shift, label), color) in WATER_SOLIDUS_SHIFTS.iter().zip([Rgb::GREEN, Rgb::RED]) {
                let shifted: Vec<f64> = tsol
                    .iter()
                    .map(|t| t - melt.delta_tsol_water * shift)
                    .collect();
                panel.push(
                    Series::from_xy(&shifted, radius, color, width)
                        .styled(LineStyle::Dashed)
                        .labelled(*label),
                );
            }
        }
        panel.x = panel.x.clone().with_range(0.0, 1.2);
    }

    /// Index of the surface level: the top of the shell, or the level closest
    /// to the base of the air layer.
    fn surface_level(pass: &ProfilePass, averaged: &AveragedProfiles) -> usize {
        let radius = &averaged.radius;
        let top = radius.len().saturating_sub(1);
        let boundaries = &pass.params.boundaries;
        if !boundaries.air_layer {
            return top;
        }
        let target = radius[top] - boundaries.air_thickness;
        radius
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - target).abs().total_cmp(&(b.1 - target).abs()))
            .map(|(i, _)| i)
            .unwrap_or(top)
    }

    pub fn figure(&self, pass: &ProfilePass) -> Option<Figure> {
        let data = &pass.data;
        if data.resolution.epochs().len() > 1 {
            warn!(
                "{}: vertical resolution changes during the run, averaging assumes it does not",
                self.name
            );
        }
        let averaged = average_profiles(&data.table, data.n_steps(), &self.desc.columns, &pass.bounds);
        if averaged.levels() == 0 {
            warn!("{}: no complete timestep to average", self.name);
            return None;
        }
        let radius = &averaged.radius;
        let width = pass.options.linewidth;

        let mut x = Axis::new(self.desc.name());
        if self.kind.log_scale() {
            x = x.log();
        }
        let y = Axis::new("Coordinate z").with_range(
            pass.bounds.r_min - RADIUS_MARGIN,
            pass.bounds.r_max + RADIUS_MARGIN,
        );
        let mut panel = Panel::new(x, y);
        panel.legend = LegendPos::MiddleLeft;

        for (i, profile) in averaged.profiles.iter().enumerate() {
            let mut series = Series::from_xy(profile, radius, Rgb::BLUE, width)
                .styled(AVERAGE_STYLES[i % AVERAGE_STYLES.len()]);
            if self.desc.has_companions() {
                if let Some(label) = self.desc.column_label(i) {
                    series = series.labelled(label);
                }
            }
            panel.push(series);
        }

        let params = &pass.params;
        if self.kind == QuantityKind::Temperature
            && params.viscosity.eta_melt
            && params.melt.is_linear()
        {
            self.solidus(pass, radius, &mut panel);
        }

        let surface = Self::surface_level(pass, &averaged);
        if params.boundaries.air_layer {
            panel.hlines.push(HLine {
                y: radius[surface],
                color: Rgb::BLACK,
                alpha: 0.1,
            });
        }

        if self.kind == QuantityKind::HorizontalVelocity {
            let velocity = averaged.profiles[0][surface];
            panel.title = Some(format!(
                "Averaged horizontal surface velocity: {:.1}",
                velocity.round()
            ));
        }

        if self.kind == QuantityKind::Viscosity && params.switches.cont_tracers {
            panel.hlines.push(HLine {
                y: radius[surface] - params.tracersin.d_archean,
                color: Rgb::SLATE_BLUE,
                alpha: 0.2,
            });
        }

        let stem = format!("fig_average{}", self.desc.file_stem());
        Some(Figure::single(stem, panel, pass.options.fontsize))
    }
}

impl ProfileOp for AveragedProfileOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn after_pass(&mut self, pass: &mut ProfilePass) -> Result<(), RprofError> {
        match self.figure(pass) {
            Some(figure) => pass.save(&figure),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlotOptions, RunParams};
    use crate::constants::{COL_HORIZONTAL_VELOCITY, COL_TEMPERATURE};
    use crate::pass::PassProps;
    use crate::plot::{MemoryWriter, Scale};
    use crate::rprof::test_util::synthetic;
    use approx::assert_abs_diff_eq;

    fn column_value(step: usize, height: f64, col: usize) -> f64 {
        match col {
            COL_TEMPERATURE => 1.0 - height + 0.1 * step as f64,
            COL_HORIZONTAL_VELOCITY => 100.0 * height + step as f64,
            _ => 1.0,
        }
    }

    fn average_figure(kind: QuantityKind, min_max: bool, params: RunParams) -> Figure {
        let writer = MemoryWriter::new("out");
        let mut pass = ProfilePass::new(PassProps {
            data: synthetic(&[11, 11, 11], 64, column_value),
            params,
            options: PlotOptions::default(),
            writer: Box::new(writer.clone()),
            ops: vec![AveragedProfileOp::handle(kind, min_max)],
        })
        .unwrap();
        pass.run().unwrap();
        writer.figures().remove(0)
    }

    #[test]
    fn averages_every_timestep() {
        let figure = average_figure(QuantityKind::Temperature, false, RunParams::default());
        assert_eq!(figure.stem, "fig_averageTemperature");
        let panel = &figure.panels[0];
        assert_eq!(panel.series.len(), 1);
        assert!(panel.series[0].label.is_none());
        // mean of steps 0, 1, 2 at the bottom
        assert_abs_diff_eq!(panel.series[0].points[0].0, 1.1, epsilon = 1e-12);
        assert_eq!(panel.series[0].points.len(), 11);
    }

    #[test]
    fn linear_solidus_with_water_shifts() {
        let params = RunParams::from_json_str(
            r#"{
                "viscosity": {"eta_melt": true},
                "melt": {"tsol0": 0.6, "dtsol_dz": 0.5, "deltaTsol_water": 0.2},
                "switches": {"tracers": true}
            }"#,
        )
        .unwrap();
        let figure = average_figure(QuantityKind::Temperature, false, params);
        let panel = &figure.panels[0];
        let labels: Vec<_> = panel
            .labelled_series()
            .filter_map(|s| s.label.as_deref())
            .collect();
        assert_eq!(
            labels,
            vec!["solidus", "solidus C_water = 0.45%", "solidus C_water = 0.90%"]
        );
        // at the CMB the solidus is tsol0 + dtsol_dz
        assert_abs_diff_eq!(panel.series[1].points[0].0, 1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(panel.series[3].points[0].0, 1.1 - 0.12, epsilon = 1e-12);
        assert_eq!(panel.x.range, Some((0.0, 1.2)));
    }

    #[test]
    fn surface_velocity_title_and_air_layer() {
        let params = RunParams::from_json_str(
            r#"{"boundaries": {"air_layer": true, "air_thickness": 0.2}}"#,
        )
        .unwrap();
        let figure = average_figure(QuantityKind::HorizontalVelocity, true, params);
        let panel = &figure.panels[0];

        // level 8 sits at height 0.8, where the mean velocity is 81
        assert_eq!(
            panel.title.as_deref(),
            Some("Averaged horizontal surface velocity: 81.0")
        );
        assert_eq!(panel.hlines.len(), 1);
        assert_abs_diff_eq!(panel.hlines[0].y, 0.8, epsilon = 1e-12);
        assert_eq!(panel.labelled_series().count(), 3);
        assert_eq!(panel.legend, LegendPos::MiddleLeft);
    }

    #[test]
    fn continent_base_on_viscosity() {
        let params = RunParams::from_json_str(
            r#"{"switches": {"cont_tracers": true}, "tracersin": {"d_archean": 0.1}}"#,
        )
        .unwrap();
        let figure = average_figure(QuantityKind::Viscosity, false, params);
        let panel = &figure.panels[0];
        assert_eq!(panel.x.scale, Scale::Log);
        assert_eq!(panel.hlines.len(), 1);
        assert_abs_diff_eq!(panel.hlines[0].y, 0.9, epsilon = 1e-12);
        assert_eq!(panel.hlines[0].color, Rgb::SLATE_BLUE);
    }
}
