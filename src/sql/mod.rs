//! Safe SQL builder: identifiers from resource declarations only, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
