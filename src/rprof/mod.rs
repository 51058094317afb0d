//! In-memory radial profile data: the ragged profile table, timestep
//! metadata, and the resolution epochs needed to find one timestep's rows.

pub mod average;
pub mod reader;

pub use average::{average_profiles, AveragedProfiles};
pub use reader::RprofReader;

use std::ops::Range;

/// Row-major table of profile samples.
///
/// Rows are depth levels of consecutive timesteps; columns are fixed
/// physical quantities. Reading a column the table does not have yields NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileTable {
    n_cols: usize,
    values: Vec<f64>,
}

impl ProfileTable {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            values: Vec::new(),
        }
    }

    /// Build a table from rows; short rows are padded with NaN.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut table = Self::new(n_cols);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, row: &[f64]) {
        let kept = row.len().min(self.n_cols);
        self.values.extend_from_slice(&row[..kept]);
        self.values
            .extend(std::iter::repeat_n(f64::NAN, self.n_cols - kept));
    }

    pub fn n_rows(&self) -> usize {
        if self.n_cols == 0 {
            0
        } else {
            self.values.len() / self.n_cols
        }
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        if col >= self.n_cols {
            return f64::NAN;
        }
        self.values[row * self.n_cols + col]
    }

    /// Values of `col` over `rows`.
    pub fn column(&self, col: usize, rows: Range<usize>) -> Vec<f64> {
        rows.map(|row| self.value(row, col)).collect()
    }
}

/// Metadata of one timestep, in file order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestepMeta {
    /// Simulation step index as written by StagYY.
    pub istep: i64,
    pub time: f64,
    pub first_row: usize,
    pub levels: usize,
}

/// A run of consecutive timesteps sharing one vertical resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionEpoch {
    /// 1-based ordinal of the last timestep in the epoch.
    pub last_step: usize,
    pub steps: usize,
    pub levels: usize,
}

impl ResolutionEpoch {
    pub fn rows(&self) -> usize {
        self.steps * self.levels
    }
}

/// Rows of one timestep: `start..=last`.
///
/// Profiles are drawn from `start..last`; the energy balance also reads the
/// final row for its top boundary correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepRows {
    pub start: usize,
    pub last: usize,
}

impl StepRows {
    pub fn profile_range(&self) -> Range<usize> {
        self.start..self.last
    }

    pub fn levels(&self) -> usize {
        (self.last + 1).saturating_sub(self.start)
    }
}

/// Resolution epochs sorted by `last_step`. A leading `(0, 0, n)` entry is
/// allowed and contributes no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionTable {
    epochs: Vec<ResolutionEpoch>,
}

impl ResolutionTable {
    pub fn new(epochs: Vec<ResolutionEpoch>) -> Self {
        Self { epochs }
    }

    pub fn constant(steps: usize, levels: usize) -> Self {
        Self::new(vec![ResolutionEpoch {
            last_step: steps,
            steps,
            levels,
        }])
    }

    /// Group consecutive timesteps with equal level counts into epochs.
    pub fn from_timesteps(timesteps: &[TimestepMeta]) -> Self {
        let mut epochs: Vec<ResolutionEpoch> = Vec::new();
        for (i, meta) in timesteps.iter().enumerate() {
            match epochs.last_mut() {
                Some(epoch) if epoch.levels == meta.levels => {
                    epoch.steps += 1;
                    epoch.last_step = i + 1;
                }
                _ => epochs.push(ResolutionEpoch {
                    last_step: i + 1,
                    steps: 1,
                    levels: meta.levels,
                }),
            }
        }
        Self::new(epochs)
    }

    pub fn epochs(&self) -> &[ResolutionEpoch] {
        &self.epochs
    }

    /// Rows of the 1-based timestep ordinal `step`.
    ///
    /// Step boundaries must match the epochs exactly; a mismatched table gives
    /// a wrong slice rather than an error.
    pub fn step_rows(&self, step: usize) -> StepRows {
        if self.epochs.is_empty() {
            return StepRows { start: 0, last: 0 };
        }
        let inn = self
            .epochs
            .partition_point(|epoch| epoch.last_step < step)
            .min(self.epochs.len() - 1);
        let previous = if inn == 0 {
            0
        } else {
            self.epochs[inn - 1].last_step
        };
        let earlier: usize = self.epochs[..inn].iter().map(ResolutionEpoch::rows).sum();
        let levels = self.epochs[inn].levels;
        let start = earlier + (step - previous - 1) * levels;
        StepRows {
            start,
            last: (start + levels).saturating_sub(1),
        }
    }
}

/// Everything read from one profile file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RprofData {
    pub table: ProfileTable,
    pub timesteps: Vec<TimestepMeta>,
    pub resolution: ResolutionTable,
}

impl RprofData {
    pub fn new(table: ProfileTable, timesteps: Vec<TimestepMeta>) -> Self {
        let resolution = ResolutionTable::from_timesteps(&timesteps);
        Self {
            table,
            timesteps,
            resolution,
        }
    }

    pub fn n_steps(&self) -> usize {
        self.timesteps.len()
    }

    /// First timestep, as a 1-based ordinal, with fewer than `min` levels.
    pub fn short_step(&self, min: usize) -> Option<(usize, usize)> {
        self.timesteps
            .iter()
            .position(|meta| meta.levels < min)
            .map(|i| (i + 1, self.timesteps[i].levels))
    }

    /// Simulation time of the 1-based timestep ordinal `step`.
    pub fn time(&self, step: usize) -> f64 {
        self.timesteps[step - 1].time
    }

    pub fn step_rows(&self, step: usize) -> StepRows {
        self.resolution.step_rows(step)
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::synthetic;
    use super::*;

    #[test]
    fn table_pads_short_rows_and_reads_missing_columns_as_nan() {
        let table = ProfileTable::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0]]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 3);
        assert_eq!(table.value(0, 2), 3.0);
        assert!(table.value(1, 1).is_nan());
        assert!(table.value(0, 64).is_nan());
        assert_eq!(table.column(0, 0..2), vec![1.0, 4.0]);
    }

    #[test]
    fn constant_resolution_starts_at_step_minus_one_times_levels() {
        let table = ResolutionTable::constant(20, 32);
        for step in 1..=20 {
            let rows = table.step_rows(step);
            assert_eq!(rows.start, (step - 1) * 32);
            assert_eq!(rows.last, rows.start + 31);
            assert_eq!(rows.levels(), 32);
        }
    }

    #[test]
    fn leading_sentinel_does_not_shift_rows() {
        let with_sentinel = ResolutionTable::new(vec![
            ResolutionEpoch { last_step: 0, steps: 0, levels: 16 },
            ResolutionEpoch { last_step: 5, steps: 5, levels: 16 },
        ]);
        let plain = ResolutionTable::constant(5, 16);
        for step in 1..=5 {
            assert_eq!(with_sentinel.step_rows(step), plain.step_rows(step));
        }
    }

    #[test]
    fn ragged_epochs_match_first_rows() {
        let data = synthetic(&[8, 8, 8, 12, 12, 6], 2, |_, h, _| h);
        assert_eq!(
            data.resolution.epochs(),
            &[
                ResolutionEpoch { last_step: 3, steps: 3, levels: 8 },
                ResolutionEpoch { last_step: 5, steps: 2, levels: 12 },
                ResolutionEpoch { last_step: 6, steps: 1, levels: 6 },
            ]
        );
        for (i, meta) in data.timesteps.iter().enumerate() {
            let rows = data.step_rows(i + 1);
            assert_eq!(rows.start, meta.first_row, "step {}", i + 1);
            assert_eq!(rows.levels(), meta.levels);
        }
    }

    #[test]
    fn empty_epoch_does_not_underflow() {
        let rows = ResolutionTable::constant(1, 0).step_rows(1);
        assert_eq!(rows, StepRows { start: 0, last: 0 });
        assert!(rows.profile_range().is_empty());
    }

    #[test]
    fn short_step_finds_the_first_truncated_timestep() {
        let data = synthetic(&[4, 4, 2], 2, |_, h, _| h);
        assert_eq!(data.short_step(3), Some((3, 2)));
        assert_eq!(data.short_step(2), None);
    }

    #[test]
    fn profile_range_excludes_final_row() {
        let rows = StepRows { start: 10, last: 19 };
        assert_eq!(rows.profile_range(), 10..19);
    }
}
