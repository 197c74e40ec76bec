use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::SystemError;
use crate::actor_framework::{sequential_ids, Entity, ResourceActor, ResourceClient};
use crate::auth::{Argon2Hasher, JwtIssuer, PasswordHasher, TokenIssuer};
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::SystemConfig;
use crate::domain::{Order, Product, User};

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub user_client: UserClient,
    pub product_client: ProductClient,
    users: ResourceClient<User>,
    products: ResourceClient<Product>,
    orders: ResourceClient<Order>,
    handles: Vec<JoinHandle<()>>,
}

fn spawn_actor<T>(buffer: usize, prefix: &'static str) -> (ResourceClient<T>, JoinHandle<()>)
where
    T: Entity<Id = String>,
{
    let (actor, client) = ResourceActor::<T>::new(buffer, sequential_ids(prefix));
    let handle = tokio::spawn(actor.run());
    (client, handle)
}

impl OrderSystem {
    /// Starts the system with Argon2 password hashing and HS256 tokens.
    /// Must be called from within a tokio runtime.
    pub fn new(config: &SystemConfig) -> Self {
        Self::with_auth(
            config,
            Arc::new(Argon2Hasher),
            Arc::new(JwtIssuer::new(&config.jwt_secret)),
        )
    }

    pub fn with_auth(
        config: &SystemConfig,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        let (users, user_handle) = spawn_actor::<User>(config.actor_buffer, "user");
        let user_client = UserClient::new(users.clone(), hasher, issuer, config.token_ttl());

        let (products, product_handle) = spawn_actor::<Product>(config.actor_buffer, "product");
        let product_client = ProductClient::new(products.clone());

        let (orders, order_handle) = spawn_actor::<Order>(config.actor_buffer, "order");
        let order_client = OrderClient::new(
            orders.clone(),
            user_client.clone(),
            product_client.clone(),
            config.conflict_retries,
        );

        info!(?config, "System started");

        Self {
            order_client,
            user_client,
            product_client,
            users,
            products,
            orders,
            handles: vec![user_handle, product_handle, order_handle],
        }
    }

    /// Stops every actor after the requests already queued and waits for them.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        // Orders first: an in-flight order change may still call the other two.
        let stops = [
            ("order", self.orders.shutdown().await),
            ("product", self.products.shutdown().await),
            ("user", self.users.shutdown().await),
        ];
        for (kind, stop) in stops {
            if let Err(e) = stop {
                debug!(kind, error = %e, "Actor already stopped");
            }
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
