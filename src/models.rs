use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    blind_date_messages, chats, comments, likes, matches, photos, settings, users,
};

/// Declares a closed set of values stored as text columns, spelled on the
/// wire exactly as in the database.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(if s.eq_ignore_ascii_case($text) {
                    return Ok($name::$variant);
                })+
                Err(format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

text_enum!(PersonalityType {
    Introvert => "INTROVERT",
    Extrovert => "EXTROVERT",
    Ambivert => "AMBIVERT",
});

text_enum!(ConnectionIntent {
    StudyBuddy => "study_buddy",
    FestAndFun => "fest_and_fun",
    GenuineConnection => "genuine_connection",
    JustVibing => "just_vibing",
    ItsComplicated => "its_complicated",
});

text_enum!(BlindDateMessageType {
    Text => "TEXT",
    Emoji => "EMOJI",
});

text_enum!(ChatMessageType {
    Text => "TEXT",
    Image => "IMAGE",
    Voice => "VOICE",
    Video => "VIDEO",
    Game => "GAME",
});

text_enum!(NotificationType {
    General => "GENERAL",
    Match => "MATCH",
    Comment => "COMMENT",
    Message => "MESSAGE",
    BlindDate => "BLIND_DATE",
    BlindDateReveal => "BLIND_DATE_REVEAL",
    Block => "BLOCK",
});

text_enum!(Theme {
    Light => "LIGHT",
    Dark => "DARK",
    System => "SYSTEM",
});

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Photo {
    pub id: Uuid,
    pub url: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<photos::Model> for Photo {
    fn from(model: photos::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            order: model.position,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// The signed-in user's own account, without credentials or one-time codes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub college: String,
    pub verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub profile: ProfileFields,
    pub profile_images: Vec<Photo>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user: users::Model, photos: Vec<Photo>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            college: user.college.clone(),
            verified: user.verified,
            last_login: user.last_login.map(|dt| dt.with_timezone(&Utc)),
            created_at: user.created_at.with_timezone(&Utc),
            profile: ProfileFields::from(user),
            profile_images: photos,
        }
    }
}

/// Editable profile attributes shared by the private and public views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileFields {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub branch: Option<String>,
    pub branch_visible: bool,
    pub height: Option<f64>,
    pub about: Option<String>,
    pub personality_type: Option<PersonalityType>,
    pub interests: Vec<String>,
    pub campus_vibe_tags: Vec<String>,
    pub favorite_artist: Vec<String>,
    pub hangout_spot: Option<String>,
    pub fun_prompt_1: Option<String>,
    pub fun_prompt_2: Option<String>,
    pub fun_prompt_3: Option<String>,
    pub current_mood: Option<String>,
    pub connection_intent: Option<ConnectionIntent>,
    pub allow_comments: bool,
}

impl From<users::Model> for ProfileFields {
    fn from(user: users::Model) -> Self {
        Self {
            age: user.age,
            gender: user.gender,
            branch: user.branch,
            branch_visible: user.branch_visible,
            height: user.height,
            about: user.about,
            personality_type: user
                .personality_type
                .as_deref()
                .and_then(|p| p.parse().ok()),
            interests: user.interests,
            campus_vibe_tags: user.campus_vibe_tags,
            favorite_artist: user.favorite_artist,
            hangout_spot: user.hangout_spot,
            fun_prompt_1: user.fun_prompt_1,
            fun_prompt_2: user.fun_prompt_2,
            fun_prompt_3: user.fun_prompt_3,
            current_mood: user.current_mood,
            connection_intent: user
                .connection_intent
                .as_deref()
                .and_then(|c| c.parse().ok()),
            allow_comments: user.allow_comments,
        }
    }
}

/// What other students see on a swipe card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub college: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
    pub profile_images: Vec<Photo>,
}

impl PublicProfile {
    pub fn new(user: users::Model, photos: Vec<Photo>) -> Self {
        let id = user.id;
        let name = user.name.clone();
        let college = user.college.clone();
        let mut profile = ProfileFields::from(user);
        if !profile.branch_visible {
            profile.branch = None;
        }
        Self {
            id,
            name,
            college,
            profile,
            profile_images: photos,
        }
    }
}

/// Compact user card used in lists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub age: Option<i32>,
    pub branch: Option<String>,
    pub photo: Option<Photo>,
}

impl UserSummary {
    pub fn new(user: &users::Model, photo: Option<Photo>) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            age: user.age,
            branch: user.branch.clone().filter(|_| user.branch_visible),
            photo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Like {
    pub id: Uuid,
    pub liker_id: Uuid,
    pub liked_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<likes::Model> for Like {
    fn from(model: likes::Model) -> Self {
        Self {
            id: model.id,
            liker_id: model.liker_id,
            liked_id: model.liked_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Match {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub compatibility: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<matches::Model> for Match {
    fn from(model: matches::Model) -> Self {
        Self {
            id: model.id,
            user1_id: model.user1_id,
            user2_id: model.user2_id,
            compatibility: model.compatibility,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// A comment as shown to the profile owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub anonymous: bool,
    /// Only present when the commenter chose to be named.
    pub commenter_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<comments::Model> for Comment {
    fn from(model: comments::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            anonymous: model.anonymous,
            commenter_id: (!model.anonymous).then_some(model.commenter_id),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Blind-date message as one participant sees it. The sender stays hidden
/// until the date is revealed; `is_mine` is enough to lay out the chat.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlindDateMessage {
    pub id: Uuid,
    pub blind_date_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub is_mine: bool,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl BlindDateMessage {
    pub fn seen_by(model: blind_date_messages::Model, viewer: Uuid, revealed: bool) -> Self {
        Self {
            id: model.id,
            blind_date_id: model.blind_date_id,
            sender_id: revealed.then_some(model.sender_id),
            is_mine: model.sender_id == viewer,
            content: model.content,
            kind: model.kind,
            anonymous: model.anonymous,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub game_type: Option<String>,
    pub starter_prompt: Option<String>,
    pub media_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<chats::Model> for ChatMessage {
    fn from(model: chats::Model) -> Self {
        Self {
            id: model.id,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            message: model.message,
            kind: model.kind,
            game_type: model.game_type,
            starter_prompt: model.starter_prompt,
            media_url: model.media_url,
            is_read: model.is_read,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSettings {
    pub theme: Theme,
    pub notifications: bool,
    pub email_visibility: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<settings::Model> for UserSettings {
    fn from(model: settings::Model) -> Self {
        Self {
            theme: model.theme.parse().unwrap_or(Theme::Light),
            notifications: model.notifications,
            email_visibility: model.email_visibility,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
