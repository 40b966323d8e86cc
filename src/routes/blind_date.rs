use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::blind_date::{
        BlindDateHistoryItem, BlindDateStarted, CurrentBlindDate, RevealOutcome,
        SendBlindDateMessageRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::BlindDateMessage,
    response::ApiResponse,
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        health,
        params::Pagination,
    },
    services::blind_date_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/current", get(current))
        .route("/message", post(send_message))
        .route("/history", get(history))
        .route("/healthy", get(health::health_check))
        .route("/{id}/reveal", post(reveal))
        .route("/{id}/end", post(end))
}

#[utoipa::path(
    post,
    path = "/api/blind-date/start",
    responses(
        (status = 201, description = "Paired with a random partner", body = ApiResponse<BlindDateStarted>),
        (status = 400, description = "Already in an active blind date"),
        (status = 404, description = "No available users")
    ),
    security(("bearer_auth" = [])),
    tag = "Blind date"
)]
pub async fn start(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<ApiResponse<BlindDateStarted>>)> {
    let resp = blind_date_service::start(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/blind-date/current",
    responses(
        (status = 200, description = "Active session with its messages", body = ApiResponse<CurrentBlindDate>),
        (status = 404, description = "No active blind date"),
        (status = 410, description = "Blind date has expired")
    ),
    security(("bearer_auth" = [])),
    tag = "Blind date"
)]
pub async fn current(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CurrentBlindDate>>> {
    let resp = blind_date_service::current(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blind-date/message",
    request_body = SendBlindDateMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = ApiResponse<BlindDateMessage>),
        (status = 400, description = "Invalid message"),
        (status = 404, description = "Blind date not found or inactive"),
        (status = 410, description = "Blind date has expired")
    ),
    security(("bearer_auth" = [])),
    tag = "Blind date"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<SendBlindDateMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BlindDateMessage>>)> {
    let resp = blind_date_service::send_message(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/blind-date/{id}/reveal",
    params(("id" = Uuid, Path, description = "Blind date id")),
    responses(
        (status = 200, description = "Consent recorded", body = ApiResponse<RevealOutcome>),
        (status = 404, description = "Blind date not found or inactive")
    ),
    security(("bearer_auth" = [])),
    tag = "Blind date"
)]
pub async fn reveal(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<RevealOutcome>>> {
    let resp = blind_date_service::reveal(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/blind-date/{id}/end",
    params(("id" = Uuid, Path, description = "Blind date id")),
    responses(
        (status = 200, description = "Blind date ended"),
        (status = 404, description = "Blind date not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Blind date"
)]
pub async fn end(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = blind_date_service::end(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blind-date/history",
    params(Pagination),
    responses(
        (status = 200, description = "Past blind dates", body = ApiResponse<Vec<BlindDateHistoryItem>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Blind date"
)]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<BlindDateHistoryItem>>>> {
    let resp = blind_date_service::history(&state, &user, pagination).await?;
    Ok(Json(resp))
}
