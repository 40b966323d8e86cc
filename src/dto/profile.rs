use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::string_or_list,
    models::{ConnectionIntent, PersonalityType, UserSummary},
};

/// Partial profile update; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    #[validate(range(min = 17, max = 100))]
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub branch: Option<String>,
    pub branch_visible: Option<bool>,
    #[validate(range(min = 50.0, max = 260.0))]
    pub height: Option<f64>,
    #[validate(length(max = 500))]
    pub about: Option<String>,
    pub personality_type: Option<PersonalityType>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub interests: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub campus_vibe_tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub favorite_artist: Option<Vec<String>>,
    pub hangout_spot: Option<String>,
    #[validate(length(max = 300))]
    pub fun_prompt_1: Option<String>,
    #[validate(length(max = 300))]
    pub fun_prompt_2: Option<String>,
    #[validate(length(max = 300))]
    pub fun_prompt_3: Option<String>,
    pub current_mood: Option<String>,
    pub connection_intent: Option<ConnectionIntent>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EngagementStats {
    pub likes_received: u64,
    pub matches_count: u64,
    pub messages_received: u64,
    pub comments_received: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceivedLike {
    pub id: uuid::Uuid,
    pub user: UserSummary,
    pub liked_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MoodResponse {
    pub current_mood: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_accepts_lowercase_connection_intent() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"connection_intent":"study_buddy","personality_type":"AMBIVERT"}"#)
                .unwrap();
        assert_eq!(req.connection_intent, Some(ConnectionIntent::StudyBuddy));
        assert_eq!(req.personality_type, Some(PersonalityType::Ambivert));
    }

    #[test]
    fn update_rejects_unknown_connection_intent() {
        let req = serde_json::from_str::<UpdateProfileRequest>(r#"{"connection_intent":"soulmate"}"#);
        assert!(req.is_err());
    }
}
