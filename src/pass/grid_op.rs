use super::{ProfileOp, ProfileOpHandle, ProfilePass};
use crate::constants::COL_HEIGHT;
use crate::error::RprofError;
use crate::plot::{Axis, Figure, LineStyle, Panel, Rgb, Series};

/// Cell heights and spacings of the vertical grid, one line per timestep.
pub struct GridPlotOp {
    /// Spacing in kilometres instead of non-dimensional units.
    km: bool,
    heights: Panel,
    spacing: Panel,
    cells: usize,
}

impl GridPlotOp {
    pub fn new(km: bool) -> Self {
        Self {
            km,
            heights: Panel::default(),
            spacing: Panel::default(),
            cells: 0,
        }
    }

    pub fn handle(km: bool) -> ProfileOpHandle {
        ProfileOpHandle::new(Box::new(Self::new(km)))
    }
}

/// `(i, v[i])` for plotting against the cell index.
fn indexed(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect()
}

impl ProfileOp for GridPlotOp {
    fn name(&self) -> &str {
        if self.km { "Grid km" } else { "Grid" }
    }

    fn init_pass(&mut self, _pass: &mut ProfilePass) -> Result<(), RprofError> {
        let dz_label = if self.km { "dz [km]" } else { "dz" };
        self.heights = Panel::new(Axis::new(""), Axis::new("z"));
        self.spacing = Panel::new(Axis::new("Cell number"), Axis::new(dz_label));
        self.cells = 0;
        Ok(())
    }

    fn update_step(&mut self, pass: &mut ProfilePass) -> Result<(), RprofError> {
        let width = pass.options.linewidth;
        let z = pass
            .data
            .table
            .column(COL_HEIGHT, pass.cursor.rows.profile_range());
        let scale = if self.km {
            pass.params.geometry.d_dimensional / 1000.0
        } else {
            1.0
        };
        let dz: Vec<f64> = z.windows(2).map(|w| (w[1] - w[0]) * scale).collect();

        self.cells = self.cells.max(z.len());
        self.heights.push(
            Series::new(indexed(&z), Rgb::BLACK, width)
                .styled(LineStyle::SolidMarked),
        );
        self.spacing.push(
            Series::new(indexed(&dz), Rgb::BLACK, width)
                .styled(LineStyle::SolidMarked),
        );
        Ok(())
    }

    fn after_pass(&mut self, pass: &mut ProfilePass) -> Result<(), RprofError> {
        let cells = self.cells as f64;
        let mut heights = std::mem::take(&mut self.heights);
        let mut spacing = std::mem::take(&mut self.spacing);
        heights.x = heights.x.with_range(0.0, cells);
        spacing.x = spacing.x.with_range(0.0, cells);

        let stem = pass.ranged_stem(if self.km { "Gridkm" } else { "Grid" });
        let figure = Figure::new(stem, vec![heights, spacing], pass.options.fontsize);
        pass.save(&figure)
    }
}
