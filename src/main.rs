use rust_decimal::Decimal;
use tracing::{info, Instrument};

use storefront::access::{authorize, Operation};
use storefront::app_system::{setup_tracing, OrderSystem, SystemError};
use storefront::config::SystemConfig;
use storefront::domain::{ProductCreate, Role};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    dotenvy::dotenv().ok();
    let config = SystemConfig::from_env()?;

    // Setup tracing once for the entire application
    setup_tracing(&config.log_filter);

    info!("Starting storefront");
    let system = OrderSystem::new(&config);

    let span = tracing::info_span!("registration");
    let (customer, manager) = async {
        let customer = system
            .user_client
            .create_user("alice".into(), "alice@example.com".into(), "alice-pw".into())
            .await?;
        let manager = system
            .user_client
            .create_user("bob".into(), "bob@example.com".into(), "bob-pw".into())
            .await?;
        let manager = system.user_client.set_role(manager.id, Role::Manager).await?;
        Ok::<_, SystemError>((customer, manager))
    }
    .instrument(span)
    .await?;

    let token = system
        .user_client
        .login("alice@example.com".into(), "alice-pw".into())
        .await?;
    info!(token_len = token.len(), "Customer logged in");

    authorize(Some(manager.role), Operation::ManageCatalog)?;
    let product = system
        .product_client
        .create_product(
            ProductCreate::new("Mechanical keyboard", "KB-001", Decimal::new(8999, 2), 10)
                .with_description("Tenkeyless, brown switches"),
        )
        .await?;

    let span = tracing::info_span!("order_processing", user_id = %customer.id);
    async {
        authorize(Some(customer.role), Operation::CreateOrder)?;
        let order = system.order_client.create_order(customer.id.clone()).await?;

        authorize(Some(customer.role), Operation::EditOrderItems)?;
        system
            .order_client
            .add_item(order.id.clone(), product.id.clone(), 3)
            .await?;
        let order = system
            .order_client
            .change_item_quantity(order.id.clone(), product.id.clone(), 5)
            .await?;
        let stock = system.product_client.check_stock(product.id.clone()).await?;
        info!(total = %order.total_price(), stock, "Cart ready");

        system.order_client.place(order.id.clone()).await?;
        for transition in [
            Operation::PayOrder,
            Operation::ConfirmPickup,
            Operation::ConfirmDelivery,
            Operation::CompleteOrder,
        ] {
            authorize(Some(manager.role), transition)?;
        }
        system.order_client.pay(order.id.clone()).await?;
        system.order_client.confirm_pickup(order.id.clone()).await?;
        system.order_client.confirm_delivery(order.id.clone()).await?;
        let order = system.order_client.complete(order.id.clone()).await?;
        info!(status = ?order.status(), total = %order.total_price(), "Order finished");

        Ok::<_, SystemError>(())
    }
    .instrument(span)
    .await?;

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
