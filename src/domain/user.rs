use std::fmt;

use crate::user_actor::UserError;

pub type UserId = String;

/// Access level of a user. Ordered so that a higher role includes every lower one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    #[default]
    Customer,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Manager, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }

    /// `true` when this role is at least `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    /// Every role this one implies, lowest first.
    pub fn granted_roles(self) -> impl Iterator<Item = Role> {
        Self::ALL.into_iter().filter(move |role| self.satisfies(*role))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a registered user in the system.
#[derive(Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Payload for creating a new user. The password is already hashed.
#[derive(Clone)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for UserCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCreate")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub role: Option<Role>,
}

pub fn validate_identity(username: &str, email: &str) -> Result<(), UserError> {
    if username.trim().is_empty() {
        return Err(UserError::Validation("username is required".to_string()));
    }
    if !email.contains('@') {
        return Err(UserError::Validation(format!("invalid email: {email}")));
    }
    Ok(())
}

impl User {
    /// New users always start as [`Role::Customer`].
    pub fn new(id: impl Into<UserId>, payload: UserCreate) -> Result<Self, UserError> {
        validate_identity(&payload.username, &payload.email)?;
        Ok(Self {
            id: id.into(),
            username: payload.username,
            email: payload.email,
            password_hash: payload.password_hash,
            role: Role::Customer,
        })
    }
}
