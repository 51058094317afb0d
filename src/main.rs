use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use stag_rprof::config::{ImageFormat, PlotOptions, RunParams, TimestepWindow};
use stag_rprof::constants::{DEFAULT_FONTSIZE, DEFAULT_LINEWIDTH};
use stag_rprof::pass::{PassProps, ProfilePass, build_ops};
use stag_rprof::plot::PlottersWriter;
use stag_rprof::rprof::RprofReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plot StagYY radial profiles", long_about = None)]
struct Cli {
    /// Radial profile file written by StagYY (`*_rprof.dat`)
    #[arg(value_hint = ValueHint::FilePath)]
    rprof: PathBuf,

    /// Run parameters as JSON (namelist sections as objects)
    #[arg(long, value_hint = ValueHint::FilePath)]
    par: Option<PathBuf>,

    /// Timestep window `start:last:step`; defaults to every timestep
    #[arg(long, value_parser = parse_window)]
    timestep: Option<TimestepWindow>,

    /// Directory receiving figures and `statmin.dat`
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    outdir: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatOpt::Svg)]
    format: FormatOpt,

    #[arg(long, default_value_t = DEFAULT_LINEWIDTH)]
    linewidth: u32,

    #[arg(long, default_value_t = DEFAULT_FONTSIZE)]
    fontsize: u32,

    /// Skip the temperature profiles
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot_temperature: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_minmaxtemp: bool,

    /// Vertical and horizontal velocity profiles
    #[arg(long, action = ArgAction::SetTrue)]
    plot_velocity: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_minmaxvelo: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_viscosity: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_minmaxvisco: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_concentration: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_minmaxcon: bool,

    /// Theoretical composition from fractional crystallization
    #[arg(long, action = ArgAction::SetTrue)]
    plot_conctheo: bool,

    /// Overturned initial temperature and concentration
    #[arg(long, action = ArgAction::SetTrue)]
    plot_overturn_init: bool,

    /// Track the distance to the overturned initial state (needs
    /// temperature, concentration and theory)
    #[arg(long, action = ArgAction::SetTrue)]
    plot_difference: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_grid: bool,

    /// Grid spacing in kilometres
    #[arg(long, action = ArgAction::SetTrue)]
    plot_grid_units: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_advection: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    plot_energy: bool,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatOpt {
    Svg,
    Png,
}

impl From<FormatOpt> for ImageFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Svg => ImageFormat::Svg,
            FormatOpt::Png => ImageFormat::Png,
        }
    }
}

fn parse_window(raw: &str) -> Result<TimestepWindow> {
    let parts = raw
        .split(':')
        .map(usize::from_str)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid timestep window {raw:?}"))?;
    match parts.as_slice() {
        [start, last] => Ok(TimestepWindow::new(*start, *last, 1)),
        [start, last, step] => Ok(TimestepWindow::new(*start, *last, *step)),
        _ => Err(anyhow!("timestep window must be start:last[:step], got {raw:?}")),
    }
}

impl Cli {
    fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            timestep: self.timestep,
            linewidth: self.linewidth,
            fontsize: self.fontsize,
            format: self.format.into(),
            outdir: self.outdir.clone(),
            plot_temperature: !self.no_plot_temperature,
            plot_minmaxtemp: self.plot_minmaxtemp,
            plot_velocity: self.plot_velocity,
            plot_minmaxvelo: self.plot_minmaxvelo,
            plot_viscosity: self.plot_viscosity,
            plot_minmaxvisco: self.plot_minmaxvisco,
            plot_concentration: self.plot_concentration,
            plot_minmaxcon: self.plot_minmaxcon,
            plot_conctheo: self.plot_conctheo,
            plot_overturn_init: self.plot_overturn_init,
            plot_difference: self.plot_difference,
            plot_grid: self.plot_grid,
            plot_grid_units: self.plot_grid_units,
            plot_advection: self.plot_advection,
            plot_energy: self.plot_energy,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let params = match &cli.par {
        Some(path) => RunParams::from_json_file(path)
            .with_context(|| format!("loading run parameters from {}", path.display()))?,
        None => {
            warn!("no run parameters given, using defaults");
            RunParams::default()
        }
    };
    let data = RprofReader::read_path(&cli.rprof)
        .with_context(|| format!("reading profiles from {}", cli.rprof.display()))?;
    info!(
        "{} timesteps, {} rows, {} columns",
        data.n_steps(),
        data.table.n_rows(),
        data.table.n_cols()
    );

    let options = cli.plot_options().normalized();
    if cli.plot_difference && !options.plot_difference {
        warn!("difference tracking needs temperature, concentration and theory plots; disabled");
    }

    let writer = PlottersWriter::new(&options.outdir, options.format);
    let ops = build_ops(&options, &params);
    let mut pass = ProfilePass::new(PassProps {
        data,
        params,
        options,
        writer: Box::new(writer),
        ops,
    })
    .context("setting up the profile pass")?;
    pass.run().context("plotting profiles")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_with_default_step() {
        assert_eq!(parse_window("2:8").unwrap(), TimestepWindow::new(2, 8, 1));
    }

    #[test]
    fn window_with_explicit_step() {
        assert_eq!(parse_window("0:30:5").unwrap(), TimestepWindow::new(0, 30, 5));
    }

    #[test]
    fn malformed_windows_are_rejected() {
        for raw in ["", "5", "1:2:3:4", "a:b", "1:-2", "1::2"] {
            assert!(parse_window(raw).is_err(), "{:?} should not parse", raw);
        }
    }

    #[test]
    fn flags_map_onto_plot_options() {
        let cli = Cli::try_parse_from([
            "stag-rprof",
            "run_rprof.dat",
            "--timestep",
            "1:4",
            "--format",
            "png",
            "--no-plot-temperature",
            "--plot-concentration",
            "--plot-grid-units",
        ])
        .unwrap();
        let options = cli.plot_options();
        assert_eq!(options.timestep, Some(TimestepWindow::new(1, 4, 1)));
        assert_eq!(options.format, ImageFormat::Png);
        assert!(!options.plot_temperature);
        assert!(options.plot_concentration);
        assert!(options.plot_grid_units);
        assert_eq!(options.linewidth, DEFAULT_LINEWIDTH);
    }
}
