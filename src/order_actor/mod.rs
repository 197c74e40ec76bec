//! Order aggregate: item edits and status transitions, one message at a time.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
