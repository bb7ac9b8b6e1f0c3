//! Route builders: per-resource CRUD under the API root, plus common routes.

pub mod common;
pub mod resource;

pub use common::common_routes;
pub use resource::resource_routes;
