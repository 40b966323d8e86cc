use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::profile::{EngagementStats, MoodResponse, ReceivedLike, UpdateProfileRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Account, Comment, Photo, PublicProfile},
    response::ApiResponse,
    routes::{
        extract::{AppJson, AppMultipart, AppPath, AppQuery},
        health,
        params::Pagination,
    },
    services::profile_service::{self, MAX_IMAGE_BYTES, MAX_UPLOAD_IMAGES, UploadedImage},
    state::AppState,
};

const IMAGE_FIELD: &str = "images";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route(
            "/upload-images",
            post(upload_images).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES * MAX_UPLOAD_IMAGES)),
        )
        .route("/stats", get(stats))
        .route("/likes", get(received_likes))
        .route("/comments", get(received_comments))
        .route("/mood", get(mood))
        .route("/healthy", get(health::health_check))
        .route("/{id}", get(public_profile))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<Account>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = profile_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<Account>),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = profile_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/profile/upload-images",
    request_body(content_type = "multipart/form-data", description = "3 to 6 files in the `images` field"),
    responses(
        (status = 201, description = "Stored photos", body = ApiResponse<Vec<Photo>>),
        (status = 400, description = "Wrong number or type of files")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn upload_images(
    State(state): State<AppState>,
    user: AuthUser,
    AppMultipart(mut multipart): AppMultipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<Photo>>>)> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {e}")))?;
        files.push(UploadedImage {
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let resp = profile_service::upload_images(&state, &user, files).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/profile/stats",
    responses(
        (status = 200, description = "Engagement counters", body = ApiResponse<EngagementStats>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<EngagementStats>>> {
    let resp = profile_service::engagement_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/likes",
    params(Pagination),
    responses(
        (status = 200, description = "Users who liked me", body = ApiResponse<Vec<ReceivedLike>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn received_likes(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<ReceivedLike>>>> {
    let resp = profile_service::received_likes(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/comments",
    params(Pagination),
    responses(
        (status = 200, description = "Comments on my profile", body = ApiResponse<Vec<Comment>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn received_comments(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<Comment>>>> {
    let resp = profile_service::received_comments(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/mood",
    responses(
        (status = 200, description = "Current mood", body = ApiResponse<MoodResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn mood(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MoodResponse>>> {
    let resp = profile_service::current_mood(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = ApiResponse<PublicProfile>),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn public_profile(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let resp = profile_service::public_profile(&state, id).await?;
    Ok(Json(resp))
}
