use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::messaging::{ChatToken, Conversation, SendMessageRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::ChatMessage,
    response::ApiResponse,
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        health,
        params::Pagination,
    },
    services::messaging_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(conversations))
        .route("/token", get(chat_token))
        .route("/healthy", get(health::health_check))
        .route("/{user_id}/messages", get(messages))
        .route("/{user_id}/message", post(send_message))
        .route("/{user_id}/unmatch", post(unmatch))
}

#[utoipa::path(
    get,
    path = "/api/messaging",
    responses(
        (status = 200, description = "Conversations, most recent first", body = ApiResponse<Vec<Conversation>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
pub async fn conversations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Conversation>>>> {
    let resp = messaging_service::conversations(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/messaging/{user_id}/messages",
    params(("user_id" = Uuid, Path, description = "Matched user"), Pagination),
    responses(
        (status = 200, description = "Messages in ascending order", body = ApiResponse<Vec<ChatMessage>>),
        (status = 403, description = "Not matched")
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
pub async fn messages(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<ChatMessage>>>> {
    let resp = messaging_service::messages(&state, &user, user_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/messaging/{user_id}/message",
    params(("user_id" = Uuid, Path, description = "Matched user")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = ApiResponse<ChatMessage>),
        (status = 403, description = "Not matched")
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(payload): AppJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ChatMessage>>)> {
    let resp = messaging_service::send_message(&state, &user, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/messaging/{user_id}/unmatch",
    params(("user_id" = Uuid, Path, description = "Matched user")),
    responses(
        (status = 200, description = "Match deactivated"),
        (status = 404, description = "Match not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
pub async fn unmatch(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = messaging_service::unmatch(&state, &user, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/messaging/token",
    responses(
        (status = 200, description = "Hosted chat user token", body = ApiResponse<ChatToken>)
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
pub async fn chat_token(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ChatToken>>> {
    let resp = messaging_service::chat_token(&state, &user).await?;
    Ok(Json(resp))
}
