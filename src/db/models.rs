use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            refresh_token: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(user_id: Uuid, prompt: String, response: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            prompt,
            response,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_no_refresh_token() {
        let user = User::new("a@example.com".to_string(), "hash".to_string());
        assert!(user.refresh_token.is_none());
        assert_eq!(user.email, "a@example.com");
    }

    #[test]
    fn test_new_message_is_owned() {
        let owner = Uuid::new_v4();
        let msg = Message::new(owner, "hi".to_string(), "hello".to_string());
        assert_eq!(msg.user_id, owner);
        assert!(msg.created_at <= Utc::now());
    }
}
