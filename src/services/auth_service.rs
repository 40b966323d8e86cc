use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use password_hash::rand_core::OsRng;
use rand::{Rng, RngCore};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::auth::{
        AuthSession, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
        VerifyEmailRequest,
    },
    entity::{
        Users,
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    error::{AppError, AppResult},
    mailer::log_send_failure,
    middleware::auth::{AuthUser, issue_token},
    models::Account,
    response::{ApiResponse, Meta},
    services::lookup::{find_user, find_user_by_email, normalize_email, photos_of},
    state::AppState,
};

const OTP_TTL_HOURS: i64 = 5;
const RESET_TTL_HOURS: i64 = 1;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(e.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|_| AppError::internal("Invalid password hash"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Six-digit email verification code.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// 40 hex characters.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub async fn signup(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<AuthSession>> {
    payload.validate()?;
    let email = normalize_email(&payload.email);

    if find_user_by_email(&state.orm, &email).await?.is_some() {
        return Err(AppError::bad_request("User already exists"));
    }

    let password_hash = hash_password(&payload.password)?;
    let otp = generate_otp();
    let now = Utc::now();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        name: Set(payload.name.trim().to_string()),
        college: Set(payload.college.trim().to_string()),
        verified: Set(false),
        otp_code: Set(Some(otp.clone())),
        otp_expires_at: Set(Some((now + Duration::hours(OTP_TTL_HOURS)).into())),
        reset_password_token: Set(None),
        reset_password_expires_at: Set(None),
        last_login: Set(None),
        age: Set(None),
        gender: Set(None),
        branch: Set(None),
        branch_visible: Set(true),
        height: Set(None),
        about: Set(None),
        personality_type: Set(None),
        interests: Set(Vec::new()),
        campus_vibe_tags: Set(Vec::new()),
        favorite_artist: Set(Vec::new()),
        hangout_spot: Set(None),
        fun_prompt_1: Set(None),
        fun_prompt_2: Set(None),
        fun_prompt_3: Set(None),
        current_mood: Set(None),
        connection_intent: Set(None),
        allow_comments: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, "user signed up");

    log_send_failure(
        state.mailer.send_verification_code(&user.email, &otp).await,
        "verification",
    );

    let token = issue_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    let session = AuthSession {
        token,
        user: Account::new(user, Vec::new()),
    };
    Ok(ApiResponse::success("User created successfully", session, Some(Meta::empty())))
}

pub async fn verify_email(
    state: &AppState,
    payload: VerifyEmailRequest,
) -> AppResult<ApiResponse<Account>> {
    let code = payload.code.trim();
    if code.is_empty() {
        return Err(AppError::bad_request("Verification code is required"));
    }

    let user = Users::find()
        .filter(UserCol::OtpCode.eq(code))
        .filter(UserCol::OtpExpiresAt.gt(Utc::now()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid or expired verification code"))?;

    let mut active: UserActive = user.into();
    active.verified = Set(true);
    active.otp_code = Set(None);
    active.otp_expires_at = Set(None);
    active.updated_at = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    tracing::info!(user_id = %user.id, "email verified");
    log_send_failure(
        state.mailer.send_welcome(&user.email, &user.name).await,
        "welcome",
    );

    let photos = photos_of(&state.orm, user.id).await?;
    Ok(ApiResponse::success(
        "Email verified successfully",
        Account::new(user, photos),
        Some(Meta::empty()),
    ))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<AuthSession>> {
    let user = find_user_by_email(&state.orm, &payload.email)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid credentials"))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::bad_request("Invalid credentials"));
    }

    let mut active: UserActive = user.into();
    active.last_login = Set(Some(Utc::now().into()));
    let user = active.update(&state.orm).await?;

    let token = issue_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    let photos = photos_of(&state.orm, user.id).await?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::success(
        "Logged in successfully",
        AuthSession {
            token,
            user: Account::new(user, photos),
        },
        Some(Meta::empty()),
    ))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;
    let user = find_user_by_email(&state.orm, &payload.email)
        .await?
        .ok_or_else(|| AppError::bad_request("User not found"))?;

    let reset_token = generate_reset_token();
    let email = user.email.clone();
    let mut active: UserActive = user.into();
    active.reset_password_token = Set(Some(reset_token.clone()));
    active.reset_password_expires_at =
        Set(Some((Utc::now() + Duration::hours(RESET_TTL_HOURS)).into()));
    active.update(&state.orm).await?;

    let reset_url = format!(
        "{}/reset-password/{}",
        state.config.client_url.trim_end_matches('/'),
        reset_token
    );
    log_send_failure(
        state.mailer.send_password_reset(&email, &reset_url).await,
        "password_reset",
    );

    Ok(ApiResponse::success(
        "Password reset link sent to your email",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn reset_password(
    state: &AppState,
    token: &str,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;
    let user = Users::find()
        .filter(UserCol::ResetPasswordToken.eq(token))
        .filter(UserCol::ResetPasswordExpiresAt.gt(Utc::now()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid or expired reset token"))?;

    let email = user.email.clone();
    let mut active: UserActive = user.into();
    active.password_hash = Set(hash_password(&payload.password)?);
    active.reset_password_token = Set(None);
    active.reset_password_expires_at = Set(None);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    log_send_failure(state.mailer.send_reset_success(&email).await, "reset_success");

    Ok(ApiResponse::success(
        "Password reset successful",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn check_auth(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Account>> {
    let account = match find_user(&state.orm, user.user_id).await {
        Err(AppError::NotFound(_)) => return Err(AppError::bad_request("User not found")),
        other => other?,
    };
    let photos = photos_of(&state.orm, account.id).await?;
    Ok(ApiResponse::success(
        "OK",
        Account::new(account, photos),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn reset_token_is_forty_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }
}
