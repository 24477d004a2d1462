//! # apm-agent-config
//!
//! Configuration resolution engine for a monitoring agent: typed options,
//! multi-source precedence, and immutable snapshots with lock-free reads.
//!
//! ## Overview
//!
//! `apm-agent-config` turns raw text from configuration sources into one
//! immutable [`ConfigSnapshot`](core::ConfigSnapshot) of every option:
//! - A fixed option catalogue (name, type, default, secrecy, mutability)
//! - Sources in a fixed precedence order (directive file, then environment)
//! - One pure parser per value type; a bad value falls back to its default
//! - Change detection: a rebuild with unchanged raw inputs publishes nothing
//! - Frozen options keep the value of the first build for the process lifetime
//! - A redacted diagnostics report of values, raw text and origins
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apm_agent_config::prelude::*;
//!
//! # fn example() -> apm_agent_config::error::Result<()> {
//! let manager = ConfigManager::builder()
//!     .with_directive_file("/etc/php/conf.d/elastic-apm.ini")
//!     .build()?;
//!
//! // Read the sources; cheap to call again at every unit of work.
//! manager.ensure_has_latest_config();
//!
//! // Lock-free read of an immutable snapshot.
//! let config = manager.get();
//! if config.enabled() {
//!     println!("Sampling {} of transactions", config.transaction_sample_rate());
//! }
//!
//! // Supportability report with secrets redacted.
//! println!("{}", manager.diagnostics());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! Directive file formats are passed through to the `config` crate:
//! `ini` and `toml` (default), `yaml`, `json`. `json` also enables
//! `DiagnosticsReport::to_json`.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod diagnostics;
pub mod error;
pub mod options;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        ConfigManager, ConfigManagerBuilder, ConfigSnapshot, ManagerMode, OptionStatus,
    };
    pub use crate::diagnostics::DiagnosticsReport;
    pub use crate::error::{ConfigError, ParseError, RejectedValue, Result, ValidationError};
    pub use crate::options::{LogLevel, OptionId, OptionValue};
    pub use crate::sources::{ConfigSource, RawConfigSourceId, RawValues};
}
