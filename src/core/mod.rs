//! Core configuration management types.

mod builder;
mod loader;
mod manager;
mod snapshot;
mod validation;

pub use builder::ConfigManagerBuilder;
pub(crate) use loader::ConfigLoader;
pub use loader::{RawData, ResolvedRaw};
pub use manager::ConfigManager;
pub use snapshot::{ConfigSnapshot, ManagerMode, OptionStatus, ResolvedOption};
pub use validation::{Constraint, Validate};
