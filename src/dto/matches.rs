use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Comment, Like, Match, PersonalityType, PublicProfile, UserSummary};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscoverQuery {
    pub college: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<String>,
    /// Comma separated, e.g. `INTROVERT,AMBIVERT`.
    pub personality_types: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl DiscoverQuery {
    /// Unknown personality names are ignored.
    pub fn personality_filter(&self) -> Vec<PersonalityType> {
        self.personality_types
            .as_deref()
            .map(|raw| raw.split(',').filter_map(|p| p.parse().ok()).collect())
            .unwrap_or_default()
    }
}

/// Optional whisper sent along with a like.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LikeRequest {
    #[validate(length(max = 500))]
    pub whisper: Option<String>,
    #[serde(default = "default_true")]
    pub anonymous: bool,
}

impl Default for LikeRequest {
    fn default() -> Self {
        Self {
            whisper: None,
            anonymous: true,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeOutcome {
    pub like: Like,
    #[serde(rename = "match")]
    pub matched: Option<Match>,
    pub is_match: bool,
    pub whisper: Option<Comment>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 500))]
    pub content: String,
    #[serde(default = "default_true")]
    pub anonymous: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchListQuery {
    #[serde(default)]
    pub in_detail: bool,
}

/// A match as seen by one participant.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchView {
    pub id: Uuid,
    pub compatibility: i32,
    pub created_at: DateTime<Utc>,
    pub user: MatchedUser,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum MatchedUser {
    Brief(UserSummary),
    Detailed(PublicProfile),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompatibilityResponse {
    pub user_id: Uuid,
    pub compatibility: u8,
}

fn default_true() -> bool {
    true
}
