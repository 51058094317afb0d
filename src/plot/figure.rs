#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const RED: Rgb = Rgb(220, 20, 20);
    pub const GREEN: Rgb = Rgb(0, 150, 0);
    pub const BLUE: Rgb = Rgb(31, 119, 180);
    pub const ORANGE: Rgb = Rgb(255, 127, 14);
    pub const SLATE_BLUE: Rgb = Rgb(123, 104, 238);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
    Markers,
    SolidMarked,
}

impl LineStyle {
    /// Styles of the companion profiles, indexed by profile position.
    pub const CYCLE: [LineStyle; 4] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::DashDot,
        LineStyle::Dotted,
    ];

    pub fn nth(i: usize) -> LineStyle {
        Self::CYCLE[i % Self::CYCLE.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
    pub style: LineStyle,
    pub width: u32,
    pub label: Option<String>,
}

impl Series {
    pub fn new(points: Vec<(f64, f64)>, color: Rgb, width: u32) -> Self {
        Self {
            points,
            color,
            style: LineStyle::Solid,
            width,
            label: None,
        }
    }

    /// Pair `x[i]` with `y[i]`; the shorter slice sets the length.
    pub fn from_xy(x: &[f64], y: &[f64], color: Rgb, width: u32) -> Self {
        Self::new(x.iter().copied().zip(y.iter().copied()).collect(), color, width)
    }

    pub fn styled(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axis {
    pub label: String,
    pub scale: Scale,
    /// Fixed range in data units; fitted to the data when `None`.
    pub range: Option<(f64, f64)>,
}

impl Axis {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn log(mut self) -> Self {
        self.scale = Scale::Log;
        self
    }

    pub fn with_range(mut self, lo: f64, hi: f64) -> Self {
        self.range = Some((lo, hi));
        self
    }

    /// Map a data value to plot coordinates: log10 on log axes, where
    /// non-positive values are dropped.
    pub fn project(&self, v: f64) -> Option<f64> {
        if !v.is_finite() {
            return None;
        }
        match self.scale {
            Scale::Linear => Some(v),
            Scale::Log if v > 0.0 => Some(v.log10()),
            Scale::Log => None,
        }
    }

    /// Plot-coordinate range covering `values`, or the fixed range.
    pub fn resolve_range(&self, values: impl Iterator<Item = f64>) -> (f64, f64) {
        if let Some((lo, hi)) = self.range {
            if let (Some(lo), Some(hi)) = (self.project(lo), self.project(hi)) {
                return (lo, hi);
            }
        }
        let (lo, hi) = values
            .filter_map(|v| self.project(v))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() {
            return (0.0, 1.0);
        }
        let pad = if hi > lo {
            0.03 * (hi - lo)
        } else {
            0.5 * lo.abs().max(1.0)
        };
        (lo - pad, hi + pad)
    }

    pub fn tick_label(&self, v: f64) -> String {
        match self.scale {
            Scale::Log => format!("{:.0e}", 10f64.powf(v)),
            Scale::Linear => {
                let a = v.abs();
                if a != 0.0 && !(1e-3..1e4).contains(&a) {
                    format!("{:.1e}", v)
                } else {
                    let s = format!("{:.3}", v);
                    s.trim_end_matches('0').trim_end_matches('.').to_string()
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HLine {
    pub y: f64,
    pub color: Rgb,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPos {
    #[default]
    UpperRight,
    LowerRight,
    MiddleLeft,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub x: Axis,
    pub y: Axis,
    pub title: Option<String>,
    pub series: Vec<Series>,
    pub hlines: Vec<HLine>,
    pub legend: LegendPos,
}

impl Panel {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn push(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn labelled_series(&self) -> impl Iterator<Item = &Series> {
        self.series.iter().filter(|s| s.label.is_some())
    }
}

/// A figure of vertically stacked panels, saved under `stem`.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub stem: String,
    pub panels: Vec<Panel>,
    pub font_size: u32,
}

impl Figure {
    pub fn new(stem: impl Into<String>, panels: Vec<Panel>, font_size: u32) -> Self {
        Self {
            stem: stem.into(),
            panels,
            font_size,
        }
    }

    pub fn single(stem: impl Into<String>, panel: Panel, font_size: u32) -> Self {
        Self::new(stem, vec![panel], font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_axis_drops_non_positive_values() {
        let axis = Axis::new("eta").log();
        assert_eq!(axis.project(100.0), Some(2.0));
        assert_eq!(axis.project(0.0), None);
        assert_eq!(axis.project(f64::NAN), None);
        let (lo, hi) = axis.resolve_range([-1.0, 10.0, 1000.0].into_iter());
        assert!(lo < 1.0 && hi > 3.0);
    }

    #[test]
    fn fixed_range_wins() {
        let axis = Axis::new("z").with_range(0.5, 2.5);
        assert_eq!(axis.resolve_range([100.0].into_iter()), (0.5, 2.5));
    }

    #[test]
    fn degenerate_data_still_gets_a_range() {
        let axis = Axis::new("T");
        let (lo, hi) = axis.resolve_range([3.0, 3.0].into_iter());
        assert!(lo < 3.0 && hi > 3.0);
        assert_eq!(axis.resolve_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn tick_labels() {
        let axis = Axis::new("T");
        assert_eq!(axis.tick_label(0.5), "0.5");
        assert_eq!(axis.tick_label(2.0), "2");
        assert_eq!(axis.tick_label(12345.0), "1.2e4");
        assert_eq!(Axis::new("eta").log().tick_label(3.0), "1e3");
    }

    #[test]
    fn line_style_cycle_wraps() {
        assert_eq!(LineStyle::nth(1), LineStyle::Dashed);
        assert_eq!(LineStyle::nth(5), LineStyle::Dashed);
    }
}
