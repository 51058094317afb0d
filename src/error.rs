use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RprofError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid run parameters: {0}")]
    Params(#[from] serde_json::Error),
    #[error("profile file line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("profile file holds no timesteps")]
    Empty,
    #[error("timestep {step} has {levels} depth levels, at least {min} are needed")]
    TooFewLevels { step: usize, levels: usize, min: usize },
    #[error("timestep window {start}:{last}:{step} does not fit {available} timesteps")]
    Window {
        start: usize,
        last: usize,
        step: usize,
        available: usize,
    },
    #[error("rendering failed: {0}")]
    Render(String),
}

impl RprofError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RprofError::Io {
            path: path.into(),
            source,
        }
    }
}
