//! Configuration source implementations.

mod config_source;
mod env;
mod file;
mod raw_values;

pub use config_source::{ConfigSource, RawConfigSourceId};
pub use env::EnvSource;
pub use file::FileSource;
pub use raw_values::RawValues;
