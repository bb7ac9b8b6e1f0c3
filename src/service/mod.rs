//! ResourceService: CRUD shaped by the derived schema.

mod crud;
mod validation;
pub use crud::ResourceService;
pub use validation::RequestValidator;
