//! Metadata model: typed descriptors for resource fields and their attributes.

pub mod attribute;
pub mod field;
pub mod resource;

pub use attribute::*;
pub use field::*;
pub use resource::*;

/// Untyped row as exchanged with storage, keyed by storage name.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// Typed record produced from a row, keyed by property name.
pub type Record = serde_json::Map<String, serde_json::Value>;
