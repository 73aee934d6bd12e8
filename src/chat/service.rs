use std::sync::Arc;

use tracing::{info, warn};

use crate::completion::{CompletionClient, CompletionError};
use crate::db::models::Message;
use crate::db::store::Store;
use crate::error::AppError;
use crate::Result;

pub struct ChatService {
    store: Arc<dyn Store>,
    completion: CompletionClient,
}

impl ChatService {
    pub fn new(store: Arc<dyn Store>, completion: CompletionClient) -> Self {
        Self { store, completion }
    }

    /// Sends the prompt to the completion API and persists the exchange.
    ///
    /// Upstream failures are absorbed: the error is rendered into the
    /// response text and the exchange is saved and returned as a normal
    /// message, so every prompt yields a persisted record. Callers cannot
    /// distinguish a genuine answer from embedded error text by any flag,
    /// only by content.
    pub async fn send_message(&self, email: &str, prompt: &str) -> Result<Message> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

        let response = match self.completion.complete(prompt).await {
            Ok(content) => content,
            Err(CompletionError::Api { status, body }) => {
                warn!("Completion API returned {} for user {}", status, user.id);
                format!("Error from AI: {} - {}", status, body)
            }
            Err(e) => {
                warn!("Completion request failed for user {}: {}", user.id, e);
                format!(
                    "Sorry, I am having trouble connecting to the AI right now. ({})",
                    e
                )
            }
        };

        let message = self
            .store
            .create_message(&Message::new(user.id, prompt.to_string(), response))
            .await?;

        info!("Saved message {} for user {}", message.id, user.id);
        Ok(message)
    }

    /// All of the user's messages in creation order.
    pub async fn get_history(&self, email: &str) -> Result<Vec<Message>> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

        self.store.messages_for_user(user.id).await
    }

    /// Deletes every message the user owns. The current set is snapshotted
    /// first and each record deleted individually; deletion never iterates a
    /// live collection.
    pub async fn clear_history(&self, email: &str) -> Result<()> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

        let messages = self.store.messages_for_user(user.id).await?;
        let count = messages.len();

        for message in messages {
            self.store.delete_message(message.id).await?;
        }

        info!("Cleared {} messages for user {}", count, user.id);
        Ok(())
    }
}
