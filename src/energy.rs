//! Radial energy balance of one timestep: advective and conductive heat flux
//! and their sum.

use crate::constants::{COL_ADVECTIVE_FLUX, COL_ENERGY_HEIGHT, COL_HEIGHT, COL_TEMPERATURE};
use crate::rprof::{ProfileTable, StepRows};

/// Heat-flux profiles on the energy grid, all of length `rows.levels()`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBalance {
    pub total: Vec<f64>,
    pub advective: Vec<f64>,
    pub conductive: Vec<f64>,
    /// Energy-grid heights with the surface (`1.0`) appended.
    pub height: Vec<f64>,
}

impl EnergyBalance {
    /// Compute the balance over `rows`. Needs at least two rows.
    ///
    /// Conduction inside the shell is the finite difference of temperature over
    /// the grid spacing. The bottom value assumes `T = 1` at the CMB and the top
    /// value `T = 0` at the surface. Advection vanishes at both boundaries.
    pub fn compute(table: &ProfileTable, rows: StepRows) -> EnergyBalance {
        let StepRows { start: r0, last: r1 } = rows;

        let mut height = table.column(COL_ENERGY_HEIGHT, r0..r1);
        height.push(1.0);

        let z = table.column(COL_HEIGHT, r0..r1 + 1);
        let temp = table.column(COL_TEMPERATURE, r0..r1 + 1);

        let mut advective = Vec::with_capacity(rows.levels());
        advective.push(0.0);
        advective.extend(table.column(COL_ADVECTIVE_FLUX, r0..r1 - 1));
        advective.push(0.0);

        let mut conductive = Vec::with_capacity(rows.levels());
        conductive.push((1.0 - temp[0]) / z[0]);
        // interior differences only use rows r0..r1
        let interior = r1 - r0;
        for i in 0..interior - 1 {
            conductive.push((temp[i] - temp[i + 1]) / (z[i + 1] - z[i]));
        }
        conductive.push(temp[interior] / (1.0 - z[interior]));

        let total = advective
            .iter()
            .zip(&conductive)
            .map(|(a, c)| a + c)
            .collect();

        EnergyBalance {
            total,
            advective,
            conductive,
            height,
        }
    }

    /// Profiles in plotting order: total, advection, conduction.
    pub fn profiles(&self) -> [&[f64]; 3] {
        [&self.total, &self.advective, &self.conductive]
    }
}
