//! Figure description, colour handling and output.
//!
//! Ops build [`Figure`] values; a [`FigureWriter`] turns them into files.
//! Keeping the description separate from plotters lets the orchestration be
//! checked without rendering anything.

pub mod colormap;
pub mod figure;
pub mod labels;
pub mod render;

pub use colormap::{time_colors, winter_r};
pub use figure::{Axis, Figure, HLine, LegendPos, LineStyle, Panel, Rgb, Scale, Series};
pub use labels::{format_time_label, python_sci};
pub use render::{FigureWriter, MemoryWriter, PlottersWriter};
