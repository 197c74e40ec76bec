//! Typed handles over the resource actors. These are the public entry points
//! of the system.

#[macro_use]
mod macros;

mod order_client;
mod product_client;
mod reservation;
mod user_client;

pub use order_client::*;
pub use product_client::*;
pub use reservation::*;
pub use user_client::*;
