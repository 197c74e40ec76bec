use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::domain::User;

/// Claims carried by an access token. `roles` lists every role the user's
/// role implies, so a Manager token also says Customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            sub: user.id.clone(),
            name: user.username.clone(),
            roles: user
                .role
                .granted_roles()
                .map(|role| role.as_str().to_string())
                .collect(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, claims: &Claims) -> Result<String, AuthError>;
}

/// HS256 JSON Web Tokens signed with a shared secret.
pub struct JwtIssuer {
    key: EncodingKey,
}

impl JwtIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| AuthError::Token(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, User};
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn manager() -> User {
        User {
            id: "user_7".to_string(),
            username: "mia".to_string(),
            email: "mia@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Manager,
        }
    }

    #[test]
    fn claims_expand_roles_and_expiry() {
        let issued_at = Utc::now();
        let claims = Claims::for_user(&manager(), issued_at, TimeDelta::hours(2));

        assert_eq!(claims.sub, "user_7");
        assert_eq!(claims.roles, vec!["Customer", "Manager"]);
        assert_eq!(claims.exp - claims.iat, 7200);
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let claims = Claims::for_user(&manager(), Utc::now(), TimeDelta::hours(2));
        let token = JwtIssuer::new("test-secret").issue(&claims).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(decoded.claims, claims);

        let wrong_key = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(wrong_key.is_err());
    }
}
