use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::db::models::{Message, User};
use crate::Result;

/// Persistence seam for users and messages.
///
/// Uniqueness of `email` is NOT enforced here; callers check before insert,
/// which is racy under concurrent registrations with the same email.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_refresh_token(&self, token: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: &User) -> Result<User>;

    /// Overwrites the user's stored refresh token (last write wins).
    async fn set_refresh_token(&self, user_id: Uuid, token: &str) -> Result<()>;

    async fn create_message(&self, message: &Message) -> Result<Message>;

    /// Messages owned by the user, in creation order.
    async fn messages_for_user(&self, user_id: Uuid) -> Result<Vec<Message>>;

    async fn delete_message(&self, message_id: Uuid) -> Result<()>;
}
