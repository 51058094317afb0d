pub mod config;
pub mod constants;
pub mod energy;
pub mod error;
pub mod geometry;
pub mod math_utils;
pub mod pass;
pub mod plot;
pub mod quantity;
pub mod rprof;
pub mod theory;

pub use error::RprofError;
