//! Plain data types and the rules that hold on them, independent of actors.

pub mod order;
pub mod product;
pub mod user;

pub use order::*;
pub use product::*;
pub use user::*;
