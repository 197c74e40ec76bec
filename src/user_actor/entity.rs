use super::error::UserError;
use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserId, UserPatch};

impl Entity for User {
    const KIND: &'static str = "user";

    type Id = UserId;
    type CreatePayload = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn from_create(id: UserId, payload: UserCreate) -> Result<Self, UserError> {
        User::new(id, payload)
    }

    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(role) = patch.role {
            self.role = role;
        }
        Ok(())
    }

    /// Username is checked across the whole directory before email, so a
    /// request clashing on both reports the username.
    fn check_unique<'a, I>(&self, mut others: I) -> Result<(), UserError>
    where
        Self: 'a,
        I: Iterator<Item = &'a Self> + Clone,
    {
        if others.clone().any(|other| other.username == self.username) {
            return Err(UserError::DuplicateUsername(self.username.clone()));
        }
        if others.any(|other| other.email == self.email) {
            return Err(UserError::DuplicateEmail(self.email.clone()));
        }
        Ok(())
    }

    /// Users have no custom actions.
    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
