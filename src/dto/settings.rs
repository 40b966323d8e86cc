use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Theme;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
    pub email_visibility: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters long"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleNotificationsRequest {
    pub notifications: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleCommentsRequest {
    pub allow_comments: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsSetting {
    pub id: Uuid,
    pub allow_comments: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    pub confirm_password: String,
}
