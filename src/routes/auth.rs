use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    routing::{get, post},
};

use crate::{
    dto::auth::{
        AuthSession, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
        VerifyEmailRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, clear_session_cookie, session_cookie},
    models::Account,
    response::{ApiResponse, Meta},
    routes::{
        extract::{AppJson, AppPath},
        health,
    },
    services::auth_service,
    state::AppState,
};

type WithCookie<T> = (StatusCode, [(header::HeaderName, HeaderValue); 1], Json<ApiResponse<T>>);

fn cookie_for(resp: &ApiResponse<AuthSession>, ttl_hours: i64) -> HeaderValue {
    match &resp.data {
        Some(session) => session_cookie(&session.token, ttl_hours),
        None => clear_session_cookie(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/verify-email", post(verify_email))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password))
        .route("/check-auth", get(check_auth))
        .route("/healthy", get(health::health_check))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification code emailed", body = ApiResponse<AuthSession>),
        (status = 400, description = "User already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> AppResult<WithCookie<AuthSession>> {
    let resp = auth_service::signup(&state, payload).await?;
    let cookie = cookie_for(&resp, state.config.jwt_ttl_hours);
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = ApiResponse<Account>),
        (status = 400, description = "Invalid or expired verification code")
    ),
    tag = "Auth"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyEmailRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = auth_service::verify_email(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<AuthSession>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<WithCookie<AuthSession>> {
    let resp = auth_service::login(&state, payload).await?;
    let cookie = cookie_for(&resp, state.config.jwt_ttl_hours);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tag = "Auth"
)]
pub async fn logout() -> WithCookie<serde_json::Value> {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ApiResponse::success(
            "Logged out successfully",
            serde_json::json!({}),
            Some(Meta::empty()),
        )),
    )
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link emailed"),
        (status = 400, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::forgot_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password/{token}",
    params(("token" = String, Path, description = "Reset token from the email link")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid or expired reset token")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    AppPath(token): AppPath<String>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::reset_password(&state, &token, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/check-auth",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<Account>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn check_auth(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = auth_service::check_auth(&state, &user).await?;
    Ok(Json(resp))
}
