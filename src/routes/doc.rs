use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            AuthSession, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
            SignupRequest, VerifyEmailRequest,
        },
        blind_date::{
            BlindDateHistoryItem, BlindDateStarted, CurrentBlindDate, HistoryPartner,
            RevealOutcome, RevealedPartner, SendBlindDateMessageRequest,
        },
        matches::{
            CommentRequest, CompatibilityResponse, LikeOutcome, LikeRequest, MatchView,
            MatchedUser,
        },
        messaging::{ChatToken, Conversation, SendMessageRequest},
        profile::{EngagementStats, MoodResponse, ReceivedLike, UpdateProfileRequest},
        settings::{
            ChangePasswordRequest, CommentsSetting, DeleteAccountRequest,
            ToggleCommentsRequest, ToggleNotificationsRequest, UpdateSettingsRequest,
        },
    },
    models::{
        Account, BlindDateMessage, BlindDateMessageType, ChatMessage, ChatMessageType, Comment,
        ConnectionIntent, Like, Match, NotificationType, PersonalityType, Photo, ProfileFields,
        PublicProfile, Theme, UserSettings, UserSummary,
    },
    response::{ApiResponse, Meta},
    routes::{auth, blind_date, health, matches, messaging, params, profile, settings},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::verify_email,
        auth::login,
        auth::logout,
        auth::forgot_password,
        auth::reset_password,
        auth::check_auth,
        profile::get_profile,
        profile::update_profile,
        profile::upload_images,
        profile::stats,
        profile::received_likes,
        profile::received_comments,
        profile::mood,
        profile::public_profile,
        matches::discover,
        matches::like,
        matches::pass,
        matches::block,
        matches::unmatch,
        matches::comment,
        matches::list_matches,
        matches::compatibility,
        blind_date::start,
        blind_date::current,
        blind_date::send_message,
        blind_date::reveal,
        blind_date::end,
        blind_date::history,
        messaging::conversations,
        messaging::messages,
        messaging::send_message,
        messaging::unmatch,
        messaging::chat_token,
        settings::get_settings,
        settings::update_settings,
        settings::change_password,
        settings::toggle_notifications,
        settings::toggle_anonymous_comments,
        settings::delete_account
    ),
    components(
        schemas(
            Account,
            ProfileFields,
            PublicProfile,
            UserSummary,
            Photo,
            Like,
            Match,
            Comment,
            BlindDateMessage,
            ChatMessage,
            UserSettings,
            PersonalityType,
            ConnectionIntent,
            BlindDateMessageType,
            ChatMessageType,
            NotificationType,
            Theme,
            SignupRequest,
            VerifyEmailRequest,
            LoginRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            AuthSession,
            UpdateProfileRequest,
            EngagementStats,
            ReceivedLike,
            MoodResponse,
            LikeRequest,
            LikeOutcome,
            CommentRequest,
            MatchView,
            MatchedUser,
            CompatibilityResponse,
            BlindDateStarted,
            CurrentBlindDate,
            SendBlindDateMessageRequest,
            RevealedPartner,
            RevealOutcome,
            HistoryPartner,
            BlindDateHistoryItem,
            Conversation,
            SendMessageRequest,
            ChatToken,
            UpdateSettingsRequest,
            ChangePasswordRequest,
            ToggleNotificationsRequest,
            ToggleCommentsRequest,
            CommentsSetting,
            DeleteAccountRequest,
            health::HealthData,
            params::Pagination,
            Meta,
            ApiResponse<Account>,
            ApiResponse<AuthSession>,
            ApiResponse<PublicProfile>,
            ApiResponse<LikeOutcome>,
            ApiResponse<UserSettings>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Signup, login and password recovery"),
        (name = "Profile", description = "Own profile, photos and engagement"),
        (name = "Matches", description = "Discovery feed, likes, blocks and comments"),
        (name = "Blind date", description = "Anonymous time-boxed chats"),
        (name = "Messaging", description = "Direct messages between matches"),
        (name = "Settings", description = "Preferences and account management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
