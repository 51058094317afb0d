use super::figure::{Figure, LegendPos, LineStyle, Panel, Rgb};
use crate::config::ImageFormat;
use crate::constants::FIGURE_SIZE_PX;
use crate::error::RprofError;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::cell::RefCell;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

/// Destination of finished figures.
pub trait FigureWriter {
    /// Persist `figure` and return where it went.
    fn write(&mut self, figure: &Figure) -> Result<PathBuf, RprofError>;

    /// Persist a plain-text side output such as the summary table.
    fn write_text(&mut self, name: &str, contents: &str) -> Result<PathBuf, RprofError>;
}

/// Renders figures with plotters into `outdir`.
pub struct PlottersWriter {
    outdir: PathBuf,
    format: ImageFormat,
    size: (u32, u32),
}

impl PlottersWriter {
    pub fn new(outdir: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            outdir: outdir.into(),
            format,
            size: FIGURE_SIZE_PX,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

impl FigureWriter for PlottersWriter {
    fn write(&mut self, figure: &Figure) -> Result<PathBuf, RprofError> {
        fs::create_dir_all(&self.outdir).map_err(|e| RprofError::io(&self.outdir, e))?;
        let path = self
            .outdir
            .join(format!("{}.{}", figure.stem, self.format.extension()));

        // the backend is dropped at the end of each arm, closing the file
        match self.format {
            ImageFormat::Svg => {
                let root = SVGBackend::new(&path, self.size).into_drawing_area();
                draw_figure(&root, figure)?;
                root.present().map_err(render_err)?;
            }
            ImageFormat::Png => {
                let root = BitMapBackend::new(&path, self.size).into_drawing_area();
                draw_figure(&root, figure)?;
                root.present().map_err(render_err)?;
            }
        }
        info!("wrote {}", path.display());
        Ok(path)
    }

    fn write_text(&mut self, name: &str, contents: &str) -> Result<PathBuf, RprofError> {
        fs::create_dir_all(&self.outdir).map_err(|e| RprofError::io(&self.outdir, e))?;
        let path = self.outdir.join(name);
        fs::write(&path, contents).map_err(|e| RprofError::io(&path, e))?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}

/// Keeps figures in memory; clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    figures: Rc<RefCell<Vec<Figure>>>,
    texts: Rc<RefCell<Vec<(String, String)>>>,
    outdir: PathBuf,
}

impl MemoryWriter {
    pub fn new(outdir: impl Into<PathBuf>) -> Self {
        Self {
            figures: Rc::default(),
            texts: Rc::default(),
            outdir: outdir.into(),
        }
    }

    pub fn figures(&self) -> Vec<Figure> {
        self.figures.borrow().clone()
    }

    pub fn find(&self, stem: &str) -> Option<Figure> {
        self.figures.borrow().iter().find(|f| f.stem == stem).cloned()
    }

    pub fn stems(&self) -> Vec<String> {
        self.figures.borrow().iter().map(|f| f.stem.clone()).collect()
    }

    /// Contents of the text output `name`, if one was written.
    pub fn text(&self, name: &str) -> Option<String> {
        self.texts
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, contents)| contents.clone())
    }
}

impl FigureWriter for MemoryWriter {
    fn write(&mut self, figure: &Figure) -> Result<PathBuf, RprofError> {
        self.figures.borrow_mut().push(figure.clone());
        Ok(self.outdir.join(&figure.stem))
    }

    fn write_text(&mut self, name: &str, contents: &str) -> Result<PathBuf, RprofError> {
        self.texts
            .borrow_mut()
            .push((name.to_string(), contents.to_string()));
        Ok(self.outdir.join(name))
    }
}

fn render_err<E: Display>(e: E) -> RprofError {
    RprofError::Render(e.to_string())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
) -> Result<(), RprofError> {
    root.fill(&WHITE).map_err(render_err)?;
    let areas = root.split_evenly((figure.panels.len().max(1), 1));
    for (area, panel) in areas.iter().zip(&figure.panels) {
        draw_panel(area, panel, figure.font_size)?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    font_size: u32,
) -> Result<(), RprofError> {
    let font = font_size as f64;
    let all_points = || panel.series.iter().flat_map(|s| s.points.iter().copied());
    let (x0, x1) = panel.x.resolve_range(all_points().map(|p| p.0));
    let (y0, y1) = panel.y.resolve_range(all_points().map(|p| p.1));

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(75);
    if let Some(title) = &panel.title {
        builder.caption(title, ("sans-serif", font * 1.1));
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    let x_fmt = |v: &f64| panel.x.tick_label(*v);
    let y_fmt = |v: &f64| panel.y.tick_label(*v);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(panel.x.label.as_str())
        .y_desc(panel.y.label.as_str())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style(("sans-serif", font * 0.85))
        .axis_desc_style(("sans-serif", font))
        .draw()
        .map_err(render_err)?;

    for hline in &panel.hlines {
        let Some(y) = panel.y.project(hline.y) else {
            continue;
        };
        let style = rgb(hline.color).mix(hline.alpha).stroke_width(2);
        chart
            .draw_series(LineSeries::new(vec![(x0, y), (x1, y)], style))
            .map_err(render_err)?;
    }

    for series in &panel.series {
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .filter_map(|&(x, y)| Some((panel.x.project(x)?, panel.y.project(y)?)))
            .collect();
        let color = rgb(series.color);
        let style = color.stroke_width(series.width);

        let anno = match series.style {
            LineStyle::Solid => chart.draw_series(LineSeries::new(points, style)),
            LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(points, 10, 6, style)),
            LineStyle::DashDot => chart.draw_series(DashedLineSeries::new(points, 14, 4, style)),
            LineStyle::Dotted => chart.draw_series(DashedLineSeries::new(points, 2, 4, style)),
            LineStyle::Markers => chart.draw_series(
                points
                    .into_iter()
                    .map(move |p| Circle::new(p, 5, color.filled())),
            ),
            LineStyle::SolidMarked => {
                chart
                    .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
                    .map_err(render_err)?;
                chart.draw_series(LineSeries::new(points, style))
            }
        }
        .map_err(render_err)?;

        if let Some(label) = &series.label {
            let glyph = series.style;
            anno.label(label.as_str()).legend(move |(x, y)| match glyph {
                LineStyle::Markers => PathElement::new(vec![(x + 8, y), (x + 12, y)], style),
                _ => PathElement::new(vec![(x, y), (x + 20, y)], style),
            });
        }
    }

    if panel.labelled_series().next().is_some() {
        let position = match panel.legend {
            LegendPos::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPos::LowerRight => SeriesLabelPosition::LowerRight,
            LegendPos::MiddleLeft => SeriesLabelPosition::MiddleLeft,
        };
        chart
            .configure_series_labels()
            .position(position)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", font * 0.85))
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::figure::{Axis, Series};

    fn sample_figure(stem: &str) -> Figure {
        let mut panel = Panel::new(Axis::new("Temperature"), Axis::new("z").with_range(0.0, 1.0));
        panel.push(
            Series::from_xy(&[1.0, 0.6, 0.0], &[0.0, 0.5, 1.0], Rgb::BLUE, 2).labelled("t=0"),
        );
        panel.push(
            Series::from_xy(&[0.9, 0.5, 0.1], &[0.0, 0.5, 1.0], Rgb::RED, 2)
                .styled(LineStyle::Dashed),
        );
        Figure::single(stem, panel, 14)
    }

    #[test]
    fn memory_writer_shares_its_store() {
        let writer = MemoryWriter::new("out");
        let mut handle = writer.clone();
        let path = handle.write(&sample_figure("Temperature_0_1_1")).unwrap();
        assert_eq!(path, PathBuf::from("out/Temperature_0_1_1"));
        assert_eq!(writer.stems(), vec!["Temperature_0_1_1"]);
        assert!(writer.find("Temperature_0_1_1").is_some());
        assert!(writer.find("missing").is_none());

        handle.write_text("statmin.dat", "rcmb\n").unwrap();
        assert_eq!(writer.text("statmin.dat").as_deref(), Some("rcmb\n"));
    }

    #[test]
    fn svg_writer_creates_the_file() {
        let dir = std::env::temp_dir().join(format!("stag_rprof_render_{}", std::process::id()));
        let mut writer = PlottersWriter::new(&dir, ImageFormat::Svg).with_size(400, 300);
        let path = writer.write(&sample_figure("render_check")).unwrap();
        assert_eq!(path, dir.join("render_check.svg"));
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        fs::remove_dir_all(&dir).ok();
    }
}
