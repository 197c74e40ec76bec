//! User directory entity with username and email uniqueness.

pub mod entity;
pub mod error;

pub use error::*;
