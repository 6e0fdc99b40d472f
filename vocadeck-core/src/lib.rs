pub mod errors;
pub mod models;
pub mod overview;
pub mod repo;
pub mod validate;

pub use errors::*;
pub use models::*;
pub use overview::*;
pub use repo::*;
