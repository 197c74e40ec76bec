//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_get`] or [`expect_action`] to assert behavior.

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::mpsc;

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};
use crate::app_system::OrderSystem;
use crate::auth::{AuthError, Claims, PasswordHasher, TokenIssuer};
use crate::clients::UserClient;
use crate::config::SystemConfig;
use crate::domain::User;

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// When testing the *Client* logic (e.g., `OrderClient`), there is no need for
/// a real `ResourceActor`. The mock client sends its messages to a channel the
/// test controls, so the test can inspect every request and answer it with
/// success, failure or stale data, deterministically.
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreatePayload, Response<T, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Asserts that the client has sent nothing further.
pub fn expect_idle<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) {
    assert!(receiver.try_recv().is_err(), "unexpected request pending");
}

/// Fast, reversible stand-in for Argon2.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain$") == Some(password)
    }
}

/// Issues readable tokens of the form `sub:role,role`.
pub struct StaticIssuer;

impl TokenIssuer for StaticIssuer {
    fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(format!("{}:{}", claims.sub, claims.roles.join(",")))
    }
}

pub fn mock_user_client(inner: ResourceClient<User>) -> UserClient {
    UserClient::new(
        inner,
        Arc::new(PlainHasher),
        Arc::new(StaticIssuer),
        TimeDelta::hours(2),
    )
}

/// A full system wired with the fast auth doubles.
pub fn test_system(conflict_retries: u32) -> OrderSystem {
    let config = SystemConfig {
        conflict_retries,
        ..SystemConfig::new("test-secret")
    };
    OrderSystem::with_auth(&config, Arc::new(PlainHasher), Arc::new(StaticIssuer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserCreate};
    use crate::user_actor::UserError;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            let user = UserCreate {
                username: "test".to_string(),
                email: "test@example.com".to_string(),
                password_hash: "plain$pw".to_string(),
            };
            client.create(user).await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.username, "test");
        let created = User::new("user_1", payload).unwrap();
        responder.send(Ok(created.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(created));
        expect_idle(&mut receiver);
    }

    #[tokio::test]
    async fn user_client_hashes_before_sending() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let users = mock_user_client(inner);

        let task = tokio::spawn(async move {
            users
                .create_user("alice".into(), "alice@example.com".into(), "pw".into())
                .await
        });

        let (payload, responder) = expect_create(&mut receiver).await.unwrap();
        assert_eq!(payload.password_hash, "plain$pw");
        let user = User::new("user_1", payload).unwrap();
        responder.send(Ok(user)).unwrap();

        let user = task.await.unwrap().unwrap();
        assert_eq!(user.role, Role::Customer);
    }

    #[tokio::test]
    async fn user_client_rejects_malformed_identity_without_sending() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let users = mock_user_client(inner);

        for (username, email, password) in [
            (" ", "alice@example.com", "pw"),
            ("alice", "alice.example.com", "pw"),
            ("alice", "alice@example.com", ""),
        ] {
            let result = users
                .create_user(username.into(), email.into(), password.into())
                .await;
            assert!(
                matches!(result, Err(UserError::Validation(_))),
                "{username:?} {email:?} {password:?}"
            );
        }
        expect_idle(&mut receiver);
    }

    #[test]
    fn plain_hasher_round_trip() {
        let hash = PlainHasher.hash("pw").unwrap();
        assert!(PlainHasher.verify("pw", &hash));
        assert!(!PlainHasher.verify("other", &hash));
    }
}
