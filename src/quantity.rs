use crate::constants::{
    COL_CONCENTRATION, COL_HORIZONTAL_VELOCITY, COL_TEMPERATURE, COL_VERTICAL_VELOCITY,
    COL_VISCOSITY, MIN_MAX_LABELS,
};

/// Physical quantities stored as (mean, min, max) column triplets in the
/// radial profile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityKind {
    Temperature,
    VerticalVelocity,
    HorizontalVelocity,
    Viscosity,
    Concentration,
}

impl QuantityKind {
    /// Quantities with a per-timestep profile figure, in plotting order.
    pub const PROFILED: [QuantityKind; 5] = [
        QuantityKind::Temperature,
        QuantityKind::VerticalVelocity,
        QuantityKind::HorizontalVelocity,
        QuantityKind::Viscosity,
        QuantityKind::Concentration,
    ];

    /// Quantities with a time-averaged figure.
    pub const AVERAGED: [QuantityKind; 4] = [
        QuantityKind::Temperature,
        QuantityKind::VerticalVelocity,
        QuantityKind::HorizontalVelocity,
        QuantityKind::Viscosity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QuantityKind::Temperature => "Temperature",
            QuantityKind::VerticalVelocity => "Vertical velocity",
            QuantityKind::HorizontalVelocity => "Horizontal velocity",
            QuantityKind::Viscosity => "Viscosity",
            QuantityKind::Concentration => "Concentration",
        }
    }

    pub fn column(&self) -> usize {
        match self {
            QuantityKind::Temperature => COL_TEMPERATURE,
            QuantityKind::VerticalVelocity => COL_VERTICAL_VELOCITY,
            QuantityKind::HorizontalVelocity => COL_HORIZONTAL_VELOCITY,
            QuantityKind::Viscosity => COL_VISCOSITY,
            QuantityKind::Concentration => COL_CONCENTRATION,
        }
    }

    /// Viscosity spans orders of magnitude and is drawn on a log axis.
    pub fn log_scale(&self) -> bool {
        matches!(self, QuantityKind::Viscosity)
    }
}

/// Axis label, legend labels and table columns of one figure.
///
/// `labels[0]` names the figure; `labels[1..]`, when present, name each
/// column in `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityDescriptor {
    pub labels: Vec<String>,
    pub columns: Vec<usize>,
}

impl QuantityDescriptor {
    pub fn new(labels: &[&str], columns: &[usize]) -> Self {
        Self {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            columns: columns.to_vec(),
        }
    }

    pub fn for_kind(kind: QuantityKind, min_max: bool) -> Self {
        let col = kind.column();
        if min_max {
            let mut labels = vec![kind.name()];
            labels.extend(MIN_MAX_LABELS);
            Self::new(&labels, &[col, col + 1, col + 2])
        } else {
            Self::new(&[kind.name()], &[col])
        }
    }

    pub fn name(&self) -> &str {
        &self.labels[0]
    }

    /// Legend label of the `i`-th profile column, if it has one.
    pub fn column_label(&self, i: usize) -> Option<&str> {
        self.labels.get(i + 1).map(String::as_str)
    }

    pub fn has_companions(&self) -> bool {
        self.columns.len() > 1
    }

    /// File-name form of the figure name.
    pub fn file_stem(&self) -> String {
        self.name().replace(' ', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_descriptor_uses_companion_columns() {
        let desc = QuantityDescriptor::for_kind(QuantityKind::Viscosity, true);
        assert_eq!(desc.columns, vec![13, 14, 15]);
        assert_eq!(desc.labels, vec!["Viscosity", "Mean", "Minimum", "Maximum"]);
        assert_eq!(desc.column_label(2), Some("Maximum"));
        assert!(desc.has_companions());
    }

    #[test]
    fn plain_descriptor_has_single_column() {
        let desc = QuantityDescriptor::for_kind(QuantityKind::HorizontalVelocity, false);
        assert_eq!(desc.columns, vec![10]);
        assert_eq!(desc.column_label(0), None);
        assert_eq!(desc.file_stem(), "Horizontal_velocity");
    }
}
