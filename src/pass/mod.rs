//! One pass over the selected timesteps, feeding every figure op.

pub mod average_op;
pub mod difference;
pub mod grid_op;
pub mod profile_op;

pub use average_op::AveragedProfileOp;
pub use difference::{DifferenceSeries, DifferenceSummaryOp, growth_rate, write_statmin};
pub use grid_op::GridPlotOp;
pub use profile_op::ProfilePlotOp;

use crate::config::{PlotOptions, RunParams, TimestepWindow};
use crate::constants::MIN_LEVELS;
use crate::error::RprofError;
use crate::geometry::RadiusBounds;
use crate::plot::{Figure, FigureWriter, Rgb, time_colors};
use crate::quantity::QuantityKind;
use crate::rprof::{RprofData, StepRows};
use crate::theory::InitialProfile;
use colored::Colorize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

pub trait ProfileOp {
    /// The name of this operator (for identification and lookup)
    fn name(&self) -> &str;

    /// Called once before the first selected timestep
    fn init_pass(&mut self, _pass: &mut ProfilePass) -> Result<(), RprofError> {
        Ok(())
    }

    /// Called for every selected timestep
    fn update_step(&mut self, _pass: &mut ProfilePass) -> Result<(), RprofError> {
        Ok(())
    }

    /// Called once after the last selected timestep
    fn after_pass(&mut self, _pass: &mut ProfilePass) -> Result<(), RprofError> {
        Ok(())
    }
}

pub struct ProfileOpHandle {
    pub op: Box<dyn ProfileOp>,
}

impl ProfileOpHandle {
    pub fn new(op: Box<dyn ProfileOp>) -> Self {
        ProfileOpHandle { op }
    }
}

#[derive(Debug, Clone)]
pub struct OpTiming {
    pub op_name: String,
    pub init_time: Duration,
    pub total_update_time: Duration,
    pub update_call_count: u32,
    pub after_time: Duration,
}

impl OpTiming {
    pub fn new(op_name: String) -> Self {
        Self {
            op_name,
            init_time: Duration::ZERO,
            total_update_time: Duration::ZERO,
            update_call_count: 0,
            after_time: Duration::ZERO,
        }
    }

    pub fn avg_update_time(&self) -> Duration {
        if self.update_call_count > 0 {
            self.total_update_time / self.update_call_count
        } else {
            Duration::ZERO
        }
    }

    pub fn total_time(&self) -> Duration {
        self.init_time + self.total_update_time + self.after_time
    }
}

/// Position of the pass inside the timestep window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepCursor {
    /// 1-based timestep ordinal.
    pub ordinal: usize,
    /// Position among the selected timesteps.
    pub index: usize,
    pub rows: StepRows,
    pub time: f64,
}

pub struct PassProps {
    pub data: RprofData,
    pub params: RunParams,
    pub options: PlotOptions,
    pub writer: Box<dyn FigureWriter>,
    pub ops: Vec<ProfileOpHandle>,
}

pub struct ProfilePass {
    pub data: RprofData,
    pub params: RunParams,
    pub options: PlotOptions,
    pub bounds: RadiusBounds,
    pub window: TimestepWindow,
    pub writer: Box<dyn FigureWriter>,
    pub ops: Vec<Box<dyn ProfileOp>>,
    /// Norms and velocity maxima shared by the temperature, concentration
    /// and summary ops.
    pub difference: DifferenceSeries,
    pub cursor: StepCursor,
    pub colors: Vec<Rgb>,
    pub op_timings: Vec<OpTiming>,
    pub written: Vec<PathBuf>,
}

impl ProfilePass {
    /// Fails when the file holds no timesteps, a timestep is too short to
    /// profile, or the requested window does not fit the data. Without a
    /// window every timestep is selected.
    pub fn new(props: PassProps) -> Result<ProfilePass, RprofError> {
        let n_steps = props.data.n_steps();
        if n_steps == 0 {
            return Err(RprofError::Empty);
        }
        if let Some((step, levels)) = props.data.short_step(MIN_LEVELS) {
            return Err(RprofError::TooFewLevels {
                step,
                levels,
                min: MIN_LEVELS,
            });
        }
        let options = props.options.normalized();
        let window = options
            .timestep
            .unwrap_or_else(|| TimestepWindow::new(0, n_steps, 1));
        window.validate(n_steps)?;

        let ops: Vec<Box<dyn ProfileOp>> = props.ops.into_iter().map(|handle| handle.op).collect();
        let op_timings = ops
            .iter()
            .map(|op| OpTiming::new(op.name().to_string()))
            .collect();

        Ok(ProfilePass {
            bounds: RadiusBounds::from_params(&props.params),
            colors: time_colors(window.len()),
            data: props.data,
            params: props.params,
            options,
            window,
            writer: props.writer,
            ops,
            difference: DifferenceSeries::default(),
            cursor: StepCursor::default(),
            op_timings,
            written: Vec::new(),
        })
    }

    pub fn run(&mut self) -> Result<(), RprofError> {
        self.pass_init()?;
        for (index, ordinal) in self.window.ordinals().enumerate() {
            self.cursor = StepCursor {
                ordinal,
                index,
                rows: self.data.step_rows(ordinal),
                time: self.data.time(ordinal),
            };
            debug!(
                "step {} rows {}..={} t={}",
                ordinal, self.cursor.rows.start, self.cursor.rows.last, self.cursor.time
            );
            self.pass_step()?;
        }
        self.pass_end()?;
        self.print_timing_report();
        Ok(())
    }

    fn pass_init(&mut self) -> Result<(), RprofError> {
        let mut ops = std::mem::take(&mut self.ops);
        let mut result = Ok(());
        for (i, op) in ops.iter_mut().enumerate() {
            let start = Instant::now();
            result = op.init_pass(self);
            self.op_timings[i].init_time = start.elapsed();
            if result.is_err() {
                break;
            }
        }
        self.ops = ops;
        result
    }

    fn pass_step(&mut self) -> Result<(), RprofError> {
        let mut ops = std::mem::take(&mut self.ops);
        let mut result = Ok(());
        for (i, op) in ops.iter_mut().enumerate() {
            let start = Instant::now();
            result = op.update_step(self);
            self.op_timings[i].total_update_time += start.elapsed();
            self.op_timings[i].update_call_count += 1;
            if result.is_err() {
                break;
            }
        }
        self.ops = ops;
        result
    }

    fn pass_end(&mut self) -> Result<(), RprofError> {
        let mut ops = std::mem::take(&mut self.ops);
        let mut result = Ok(());
        for (i, op) in ops.iter_mut().enumerate() {
            let start = Instant::now();
            result = op.after_pass(self);
            self.op_timings[i].after_time = start.elapsed();
            if result.is_err() {
                break;
            }
        }
        self.ops = ops;
        result
    }

    pub fn is_first_step(&self) -> bool {
        self.cursor.index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.cursor.index + 1 == self.window.len()
    }

    /// Line colour of the current timestep.
    pub fn color(&self) -> Rgb {
        self.colors
            .get(self.cursor.index)
            .copied()
            .unwrap_or(Rgb::BLUE)
    }

    /// Simulation times of the selected timesteps.
    pub fn step_times(&self) -> Vec<f64> {
        self.window.ordinals().map(|o| self.data.time(o)).collect()
    }

    /// `{stem}_{start}_{last-1}_{step}`.
    pub fn ranged_stem(&self, stem: &str) -> String {
        format!("{}_{}", stem, self.window.tag())
    }

    pub fn save(&mut self, figure: &Figure) -> Result<(), RprofError> {
        let path = self.writer.write(figure)?;
        self.written.push(path);
        Ok(())
    }

    pub fn save_text(&mut self, name: &str, contents: &str) -> Result<(), RprofError> {
        let path = self.writer.write_text(name, contents)?;
        self.written.push(path);
        Ok(())
    }

    pub fn print_timing_report(&self) {
        println!("\n{}", "📊 === PROFILE PASS TIMING REPORT ===".bold().cyan());
        println!("🔄 Timesteps: {} ({})", self.window.len(), self.window.tag());
        println!("🖼️  Files written: {}", self.written.len());
        println!();

        let total_time: Duration = self.op_timings.iter().map(OpTiming::total_time).sum();

        println!("{}", "📈 PER-OPERATION BREAKDOWN:".bold());
        for timing in &self.op_timings {
            let total_op_time = timing.total_time();
            let percentage = if total_time.as_micros() > 0 {
                (total_op_time.as_micros() as f64 / total_time.as_micros() as f64) * 100.0
            } else {
                0.0
            };

            println!(
                "  🔧 {:<28} | Total: {:>8.2}ms | Avg/step: {:>8.3}ms | Init: {:>6.2}ms | After: {:>8.2}ms | Share: {:>5.1}%",
                timing.op_name.green(),
                total_op_time.as_secs_f64() * 1e3,
                timing.avg_update_time().as_secs_f64() * 1e3,
                timing.init_time.as_secs_f64() * 1e3,
                timing.after_time.as_secs_f64() * 1e3,
                percentage
            );
        }

        println!();
        println!(
            "⏱️  TOTAL PASS TIME: {:.2}ms ({:.2}s)",
            total_time.as_secs_f64() * 1e3,
            total_time.as_secs_f64()
        );
        println!("{}", "📊 === END TIMING REPORT ===\n".bold().cyan());
    }
}

/// Ops for every figure `options` asks for, in output order: per-timestep
/// profiles, time averages, the difference summary, grids, advection and
/// the energy balance.
pub fn build_ops(options: &PlotOptions, params: &RunParams) -> Vec<ProfileOpHandle> {
    let options = options.clone().normalized();
    let bounds = RadiusBounds::from_params(params);
    let theory = options
        .plot_conctheo
        .then(|| InitialProfile::from_tracers(bounds, &params.tracersin));

    let mut ops = Vec::new();
    for kind in QuantityKind::PROFILED {
        if !options.wants(kind) {
            continue;
        }
        let kind_theory = match kind {
            QuantityKind::Concentration => theory,
            _ => None,
        };
        ops.push(ProfilePlotOp::quantity(
            kind,
            options.wants_min_max(kind),
            kind_theory,
        ));
    }
    for kind in QuantityKind::AVERAGED {
        if options.wants(kind) {
            ops.push(AveragedProfileOp::handle(kind, options.wants_min_max(kind)));
        }
    }
    if options.plot_difference {
        ops.push(DifferenceSummaryOp::handle());
    }
    if options.plot_grid {
        ops.push(GridPlotOp::handle(false));
    }
    if options.plot_grid_units {
        ops.push(GridPlotOp::handle(true));
    }
    if options.plot_advection {
        ops.push(ProfilePlotOp::advection(false));
        if params.geometry.is_spherical() {
            ops.push(ProfilePlotOp::advection(true));
        }
    }
    if options.plot_energy {
        ops.push(ProfilePlotOp::energy());
    }
    ops
}
