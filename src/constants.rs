// Column layout of the StagYY radial profile table.
pub const COL_HEIGHT: usize = 0;
pub const COL_TEMPERATURE: usize = 1;
pub const COL_VERTICAL_VELOCITY: usize = 7;
pub const COL_HORIZONTAL_VELOCITY: usize = 10;
pub const COL_VISCOSITY: usize = 13;
pub const COL_CONCENTRATION: usize = 36;
pub const COL_ADVECTION_TOTAL: usize = 57;
pub const COL_ADVECTION_DOWN: usize = 58;
pub const COL_ADVECTION_UP: usize = 59;
pub const COL_ADVECTIVE_FLUX: usize = 60;
pub const COL_ENERGY_HEIGHT: usize = 63;

/// Column scanned for the maximum vertical velocity in difference mode.
pub const COL_MAX_VERTICAL_VELOCITY: usize = COL_VERTICAL_VELOCITY;

pub const ADVECTION_COLUMNS: [usize; 3] =
    [COL_ADVECTION_TOTAL, COL_ADVECTION_DOWN, COL_ADVECTION_UP];

/// Labels of the min/max companion profiles, after the quantity name.
pub const MIN_MAX_LABELS: [&str; 3] = ["Mean", "Minimum", "Maximum"];

/// Fewest depth levels a timestep needs: two profile rows plus the final row.
pub const MIN_LEVELS: usize = 3;

// Figure layout
pub const RADIUS_MARGIN: f64 = 0.05;
pub const COLORMAP_SPAN: f64 = 0.9;
pub const THEORY_SAMPLES: usize = 1000;
pub const DEFAULT_LINEWIDTH: u32 = 2;
pub const DEFAULT_FONTSIZE: u32 = 16;
pub const FIGURE_SIZE_PX: (u32, u32) = (1024, 768);

/// Fixed name of the difference-mode summary table.
pub const STATMIN_FILE: &str = "statmin.dat";
pub const STATMIN_FIELD_WIDTH: usize = 12;
pub const STATMIN_PRECISION: usize = 5;

/// Offset between the current step and the step used by the growth-rate estimate.
pub const GROWTH_RATE_LAG: usize = 3;

/// Solidus shifts applied per unit of `deltaTsol_water` when tracers carry water.
pub const WATER_SOLIDUS_SHIFTS: [(f64, &str); 2] = [
    (0.3, "solidus C_water = 0.45%"),
    (0.6, "solidus C_water = 0.90%"),
];
