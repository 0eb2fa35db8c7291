//! Command-line interface for urtica.

mod commands;
pub mod icons;

pub use commands::{is_verbose, run};
