use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    routing::{delete, get, put},
};

use crate::{
    dto::settings::{
        ChangePasswordRequest, CommentsSetting, DeleteAccountRequest, ToggleCommentsRequest,
        ToggleNotificationsRequest, UpdateSettingsRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, clear_session_cookie},
    models::UserSettings,
    response::ApiResponse,
    routes::{extract::AppJson, health},
    services::settings_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/change-password", put(change_password))
        .route("/notifications", put(toggle_notifications))
        .route("/anonymous-comments", put(toggle_anonymous_comments))
        .route("/delete-account", delete(delete_account))
        .route("/healthy", get(health::health_check))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current settings", body = ApiResponse<UserSettings>)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserSettings>>> {
    let resp = settings_service::get_settings(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = ApiResponse<UserSettings>)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateSettingsRequest>,
) -> AppResult<Json<ApiResponse<UserSettings>>> {
    let resp = settings_service::update_settings(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Current password is incorrect")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = settings_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings/notifications",
    request_body = ToggleNotificationsRequest,
    responses(
        (status = 200, description = "Notification preference saved", body = ApiResponse<UserSettings>)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn toggle_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ToggleNotificationsRequest>,
) -> AppResult<Json<ApiResponse<UserSettings>>> {
    let resp = settings_service::toggle_notifications(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings/anonymous-comments",
    request_body = ToggleCommentsRequest,
    responses(
        (status = 200, description = "Comment preference saved", body = ApiResponse<CommentsSetting>)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn toggle_anonymous_comments(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ToggleCommentsRequest>,
) -> AppResult<Json<ApiResponse<CommentsSetting>>> {
    let resp = settings_service::toggle_anonymous_comments(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/settings/delete-account",
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted, session cookie cleared"),
        (status = 400, description = "Incorrect password")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<DeleteAccountRequest>,
) -> AppResult<(
    StatusCode,
    [(header::HeaderName, HeaderValue); 1],
    Json<ApiResponse<serde_json::Value>>,
)> {
    let resp = settings_service::delete_account(&state, &user, payload).await?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(resp),
    ))
}
