use stockroom_core::UserId;
use stockroom_users::User;

/// Authenticated user context for a request.
///
/// Attached by the auth middleware; present on every route behind it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    user: User,
}

impl CurrentUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}
