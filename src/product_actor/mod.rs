//! Product catalog entity: validation, SKU uniqueness, and stock actions.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
