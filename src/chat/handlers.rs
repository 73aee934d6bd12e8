use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthedUser;
use crate::db::models::Message;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub prompt: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for ChatResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            prompt: message.prompt,
            response: message.response,
            timestamp: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<ChatResponse>,
}

pub async fn send_message(
    user: AuthedUser,
    req: web::Json<ChatRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Chat request from {}", user.email);

    let message = state.chat_service.send_message(&user.email, &req.prompt).await?;

    Ok(HttpResponse::Ok().json(ChatResponse::from(message)))
}

pub async fn get_history(
    user: AuthedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let messages = state.chat_service.get_history(&user.email).await?;

    Ok(HttpResponse::Ok().json(HistoryResponse {
        messages: messages.into_iter().map(ChatResponse::from).collect(),
    }))
}

pub async fn clear_history(
    user: AuthedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Clearing history for {}", user.email);

    state.chat_service.clear_history(&user.email).await?;

    Ok(HttpResponse::NoContent().finish())
}
