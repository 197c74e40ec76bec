//! # storefront
//!
//! An in-memory shop backend: a user directory, a product catalog and an
//! order engine whose status machine is coupled to catalog stock.
//!
//! Each table is owned by one [`actor_framework::ResourceActor`] task and is
//! only reachable through the typed clients in [`clients`]. Cross-table work
//! (moving stock while editing an order) is coordinated by
//! [`clients::OrderClient`] with reservations that are committed or rolled
//! back.
//!
//! ```no_run
//! use storefront::app_system::OrderSystem;
//! use storefront::config::SystemConfig;
//!
//! # async fn run() -> Result<(), storefront::app_system::SystemError> {
//! let system = OrderSystem::new(&SystemConfig::from_env()?);
//! let alice = system
//!     .user_client
//!     .create_user("alice".into(), "alice@example.com".into(), "pw".into())
//!     .await?;
//! let _order = system.order_client.create_order(alice.id).await?;
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod actor_framework;
pub mod app_system;
pub mod auth;
pub mod clients;
pub mod config;
pub mod domain;
pub mod order_actor;
pub mod product_actor;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
