//! Support library for the mlra shell, shared with the fuzz targets.

pub mod fuzzing;
pub mod parser;
pub mod presets;
pub mod shell;
pub mod summary;
