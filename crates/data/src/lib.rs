//! Data loading and validation for run configuration and content.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
