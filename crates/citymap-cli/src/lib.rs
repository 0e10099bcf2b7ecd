//! citymap command-line tool library.
//!
//! Loads CityGML schema mapping documents, merges extension mappings into a
//! base mapping and reports on the result.

pub mod commands;
pub mod config;
pub mod error;
pub mod formatter;

pub use commands::{inspect, load, run, summarize, tables};
pub use config::{Args, Task, ToolConfig};
pub use error::Error;
pub use formatter::OutputFormat;
