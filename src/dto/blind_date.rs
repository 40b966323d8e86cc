use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{BlindDateMessage, BlindDateMessageType, Photo};

#[derive(Debug, Serialize, ToSchema)]
pub struct BlindDateStarted {
    pub blind_date_id: Uuid,
    /// Always null: a new date starts anonymous.
    pub partner_id: Option<Uuid>,
    /// Minutes.
    pub duration: i32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentBlindDate {
    pub blind_date_id: Uuid,
    /// Null until both sides agreed to reveal.
    pub partner_id: Option<Uuid>,
    /// Seconds.
    pub time_remaining: i64,
    pub revealed: bool,
    pub can_reveal: bool,
    pub messages: Vec<BlindDateMessage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendBlindDateMessageRequest {
    pub blind_date_id: Uuid,
    pub content: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

impl SendBlindDateMessageRequest {
    pub fn message_type(&self) -> Option<BlindDateMessageType> {
        self.kind.parse().ok()
    }
}

fn default_kind() -> String {
    BlindDateMessageType::Text.as_str().to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevealedPartner {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub about: Option<String>,
    pub photo: Option<Photo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevealOutcome {
    pub revealed: bool,
    pub waiting_for_partner: bool,
    pub partner: Option<RevealedPartner>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryPartner {
    pub id: Uuid,
    pub name: String,
    pub photo: Option<Photo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BlindDateHistoryItem {
    pub id: Uuid,
    /// Only known once both sides agreed to reveal.
    pub partner: Option<HistoryPartner>,
    pub duration: i32,
    pub revealed: bool,
    pub message_count: u64,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}
