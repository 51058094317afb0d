use super::ProfileTable;
use crate::constants::COL_HEIGHT;
use crate::geometry::RadiusBounds;

/// Time-averaged profiles on the radius grid of the first timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedProfiles {
    pub radius: Vec<f64>,
    /// One averaged profile per requested column, in request order.
    pub profiles: Vec<Vec<f64>>,
}

impl AveragedProfiles {
    pub fn levels(&self) -> usize {
        self.radius.len()
    }
}

/// Average `columns` over `n_steps` equally sized timestep chunks.
///
/// Assumes one vertical resolution for the whole table: the chunk size is
/// `n_rows / n_steps` and rows past `n_steps` full chunks are ignored. If the
/// resolution changed inside the table the result is silently wrong.
pub fn average_profiles(
    table: &ProfileTable,
    n_steps: usize,
    columns: &[usize],
    bounds: &RadiusBounds,
) -> AveragedProfiles {
    if n_steps == 0 {
        return AveragedProfiles {
            radius: Vec::new(),
            profiles: vec![Vec::new(); columns.len()],
        };
    }
    let levels = table.n_rows() / n_steps;

    let radius = table
        .column(COL_HEIGHT, 0..levels)
        .into_iter()
        .map(|h| bounds.radius(h))
        .collect();

    let profiles = columns
        .iter()
        .map(|&col| {
            (0..levels)
                .map(|level| {
                    let sum: f64 = (0..n_steps)
                        .map(|chunk| table.value(chunk * levels + level, col))
                        .sum();
                    sum / n_steps as f64
                })
                .collect()
        })
        .collect();

    AveragedProfiles { radius, profiles }
}
