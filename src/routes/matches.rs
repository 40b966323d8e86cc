use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::matches::{
        CommentRequest, CompatibilityResponse, DiscoverQuery, LikeOutcome, LikeRequest,
        MatchListQuery, MatchView,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Comment, PublicProfile},
    response::ApiResponse,
    routes::{
        extract::{AppJson, AppPath, AppQuery},
        health,
    },
    services::match_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_matches))
        .route("/profiles", get(discover))
        .route("/like/{profile_id}", post(like))
        .route("/pass/{profile_id}", post(pass))
        .route("/block/{profile_id}", post(block))
        .route("/unmatch/{match_id}", post(unmatch))
        .route("/comment/{profile_id}", post(comment))
        .route("/compatibility/{user_id}", get(compatibility))
        .route("/healthy", get(health::health_check))
}

#[utoipa::path(
    get,
    path = "/api/matches/profiles",
    params(DiscoverQuery),
    responses(
        (status = 200, description = "Discovery feed", body = ApiResponse<Vec<PublicProfile>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn discover(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<DiscoverQuery>,
) -> AppResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let resp = match_service::discover_profiles(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/matches/like/{profile_id}",
    params(("profile_id" = Uuid, Path, description = "Profile to like")),
    request_body(content = LikeRequest, description = "Optional whisper"),
    responses(
        (status = 200, description = "Like stored, match reported when mutual", body = ApiResponse<LikeOutcome>),
        (status = 400, description = "Self like or already liked"),
        (status = 403, description = "Blocked"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(profile_id): AppPath<Uuid>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<LikeOutcome>>> {
    // The body is optional: a bare like carries no whisper.
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        LikeRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::bad_request(format!("Invalid request body: {e}")))?
    };
    let resp = match_service::like_profile(&state, &user, profile_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/matches/pass/{profile_id}",
    params(("profile_id" = Uuid, Path, description = "Profile to skip")),
    responses(
        (status = 200, description = "Profile passed")
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn pass(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(profile_id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = match_service::pass_profile(&state, &user, profile_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/matches/block/{profile_id}",
    params(("profile_id" = Uuid, Path, description = "Profile to block")),
    responses(
        (status = 200, description = "Profile blocked"),
        (status = 400, description = "Self block or already blocked")
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn block(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(profile_id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = match_service::block_profile(&state, &user, profile_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/matches/unmatch/{match_id}",
    params(("match_id" = Uuid, Path, description = "Match id")),
    responses(
        (status = 200, description = "Match removed"),
        (status = 404, description = "Match not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn unmatch(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(match_id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = match_service::unmatch(&state, &user, match_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/matches/comment/{profile_id}",
    params(("profile_id" = Uuid, Path, description = "Profile to comment on")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<Comment>),
        (status = 403, description = "Comments are not allowed on this profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn comment(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(profile_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Comment>>)> {
    let resp = match_service::add_comment(&state, &user, profile_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/matches",
    params(MatchListQuery),
    responses(
        (status = 200, description = "Active matches", body = ApiResponse<Vec<MatchView>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn list_matches(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<MatchListQuery>,
) -> AppResult<Json<ApiResponse<Vec<MatchView>>>> {
    let resp = match_service::list_matches(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/matches/compatibility/{user_id}",
    params(("user_id" = Uuid, Path, description = "Other user")),
    responses(
        (status = 200, description = "Compatibility score", body = ApiResponse<CompatibilityResponse>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Matches"
)]
pub async fn compatibility(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<CompatibilityResponse>>> {
    let resp = match_service::compatibility_with(&state, &user, user_id).await?;
    Ok(Json(resp))
}
