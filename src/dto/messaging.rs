use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{ChatMessage, ChatMessageType, UserSummary};

#[derive(Debug, Serialize, ToSchema)]
pub struct Conversation {
    pub match_id: Uuid,
    pub user: UserSummary,
    pub last_message: Option<ChatMessage>,
    pub unread_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Last activity: the newest message, or the match itself.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map(|m| m.created_at)
            .unwrap_or(self.created_at)
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub message: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ChatMessageType,
    pub game_type: Option<String>,
    #[validate(length(max = 2048))]
    pub media_url: Option<String>,
}

fn default_kind() -> ChatMessageType {
    ChatMessageType::Text
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatToken {
    pub user_id: Uuid,
    pub api_key: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatClaims {
    pub user_id: String,
    pub iat: usize,
}
