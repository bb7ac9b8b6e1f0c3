pub mod capabilities;
pub use capabilities::*;
