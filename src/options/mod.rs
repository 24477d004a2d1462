//! Option catalogue, typed values and the parsers between them.

mod metadata;
pub mod parse;
mod value;

pub use metadata::{
    CATALOGUE, KeyNaming, MetadataTable, Mutability, OptionDefinition, OptionId, OptionMetadata,
    build_metadata,
};
pub use parse::parse_value;
pub use value::{
    DurationUnits, LevelScale, LogLevel, NO_VALUE, NOT_SET, OptionValue, SizeUnits, ValueType,
};
