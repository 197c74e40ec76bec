use std::fmt;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{Filter, ResourceClient};
use crate::auth::{AuthError, Claims, PasswordHasher, TokenIssuer};
use crate::domain::{validate_identity, Role, User, UserCreate, UserId, UserPatch};
use crate::user_actor::UserError;

/// Client for interacting with the User actor.
///
/// Passwords are hashed and verified here, on the blocking pool, so the user
/// actor only ever sees hashes.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
    token_ttl: TimeDelta,
}

impl fmt::Debug for UserClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserClient")
            .field("inner", &self.inner)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl_client_methods!(UserClient, User, UserError, user);

impl UserClient {
    pub fn new(
        inner: ResourceClient<User>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
        token_ttl: TimeDelta,
    ) -> Self {
        Self {
            inner,
            hasher,
            issuer,
            token_ttl,
        }
    }

    /// Registers a new customer.
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, UserError> {
        debug!("Sending request");
        validate_identity(&username, &email)?;
        if password.is_empty() {
            return Err(UserError::Validation("password is required".to_string()));
        }

        let password_hash = self.hash(password).await?;
        let user = self
            .inner
            .create(UserCreate {
                username,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Resolves a user by email and password. An unknown email and a wrong
    /// password both fail with `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: String, password: String) -> Result<User, UserError> {
        debug!("Sending request");
        let user = self
            .inner
            .find(Filter::new(move |user: &User| user.email == email))
            .await?;

        let Some(user) = user else {
            warn!("Authentication failed");
            return Err(UserError::InvalidCredentials);
        };

        if !self.verify(password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "Authentication failed");
            return Err(UserError::InvalidCredentials);
        }

        debug!(user_id = %user.id, "Authenticated");
        Ok(user)
    }

    /// Authenticates and issues a signed access token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: String, password: String) -> Result<String, UserError> {
        let user = self.authenticate(email, password).await?;
        let claims = Claims::for_user(&user, Utc::now(), self.token_ttl);

        let token = self.issuer.issue(&claims)?;
        info!(user_id = %user.id, roles = ?claims.roles, "Token issued");
        Ok(token)
    }

    #[instrument(skip(self))]
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<User, UserError> {
        debug!("Sending request");
        let user = self.inner.update(id, UserPatch { role: Some(role) }).await?;
        info!(user_id = %user.id, %role, "Role changed");
        Ok(user)
    }

    async fn hash(&self, password: String) -> Result<String, UserError> {
        let hasher = Arc::clone(&self.hasher);
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(hashed?)
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool, UserError> {
        let hasher = Arc::clone(&self.hasher);
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(verified)
    }
}
