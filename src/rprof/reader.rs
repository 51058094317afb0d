//! Reader for StagYY `*_rprof.dat` files.
//!
//! A timestep starts with a header line such as
//! `*******************step:    100 ; time:   1.00000000E-03`
//! followed by one whitespace-separated row per depth level.

use super::{ProfileTable, RprofData, TimestepMeta};
use crate::constants::MIN_LEVELS;
use crate::error::RprofError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

pub struct RprofReader;

impl RprofReader {
    pub fn read_path<P: AsRef<Path>>(path: P) -> Result<RprofData, RprofError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RprofError::io(path, e))?;
        let data = Self::read(BufReader::new(file)).map_err(|e| match e {
            RprofError::Io { source, .. } => RprofError::io(path, source),
            other => other,
        })?;
        info!(
            "read {} timesteps ({} rows, {} resolution epochs) from {}",
            data.n_steps(),
            data.table.n_rows(),
            data.resolution.epochs().len(),
            path.display()
        );
        Ok(data)
    }

    pub fn parse_str(text: &str) -> Result<RprofData, RprofError> {
        Self::read(text.as_bytes())
    }

    pub fn read<R: BufRead>(reader: R) -> Result<RprofData, RprofError> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut timesteps: Vec<TimestepMeta> = Vec::new();
        let mut header_lines: Vec<usize> = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|e| RprofError::io("<profile stream>", e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with('*') {
                let (istep, time) = parse_header(trimmed).ok_or_else(|| RprofError::Parse {
                    line: line_no,
                    reason: format!("malformed timestep header {:?}", trimmed),
                })?;
                debug!("timestep header: step {} time {:e}", istep, time);
                timesteps.push(TimestepMeta {
                    istep,
                    time,
                    first_row: rows.len(),
                    levels: 0,
                });
                header_lines.push(line_no);
                continue;
            }

            let Some(current) = timesteps.last_mut() else {
                return Err(RprofError::Parse {
                    line: line_no,
                    reason: "profile row before the first timestep header".to_string(),
                });
            };
            let row = trimmed
                .split_whitespace()
                .map(parse_fortran_f64)
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| RprofError::Parse {
                    line: line_no,
                    reason: format!("non-numeric value in {:?}", trimmed),
                })?;
            current.levels += 1;
            rows.push(row);
        }

        if timesteps.is_empty() {
            return Err(RprofError::Empty);
        }
        // a run killed while writing leaves a truncated last timestep
        if let Some((meta, &line)) = timesteps
            .iter()
            .zip(&header_lines)
            .find(|(meta, _)| meta.levels < MIN_LEVELS)
        {
            return Err(RprofError::Parse {
                line,
                reason: format!(
                    "timestep {} has {} depth levels, at least {} are needed",
                    meta.istep, meta.levels, MIN_LEVELS
                ),
            });
        }
        Ok(RprofData::new(ProfileTable::from_rows(&rows), timesteps))
    }
}

fn parse_header(line: &str) -> Option<(i64, f64)> {
    let body = line.trim_start_matches('*');
    let mut istep = None;
    let mut time = None;
    for field in body.split(';') {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        match key.trim() {
            "step" => istep = value.trim().parse::<i64>().ok(),
            "time" => time = parse_fortran_f64(value.trim()),
            _ => {}
        }
    }
    Some((istep?, time?))
}

/// Parse a float as printed by Fortran, which drops the `E` when the exponent
/// needs three digits (`1.0-100`).
pub fn parse_fortran_f64(token: &str) -> Option<f64> {
    if let Ok(value) = token.parse::<f64>() {
        return Some(value);
    }
    let split = token
        .char_indices()
        .skip(1)
        .filter(|&(_, c)| c == '+' || c == '-')
        .map(|(i, _)| i)
        .last()?;
    let (mantissa, exponent) = token.split_at(split);
    let mantissa = mantissa.trim_end_matches(['e', 'E', 'd', 'D']);
    format!("{}e{}", mantissa, exponent).parse().ok()
}
