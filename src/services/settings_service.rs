use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::settings::{
        ChangePasswordRequest, CommentsSetting, DeleteAccountRequest, ToggleCommentsRequest,
        ToggleNotificationsRequest, UpdateSettingsRequest,
    },
    entity::{
        BlindDateMessages, BlindDates, Blocks, Chats, Comments, Likes, Matches, Notifications,
        Passes, Photos, Settings, Users, blind_date_messages, blind_dates, blocks, chats,
        comments, likes, matches, notifications, passes, photos,
        settings::{self, ActiveModel as SettingsActive, Model as SettingsModel},
        users::ActiveModel as UserActive,
    },
    error::{AppError, AppResult},
    mailer::log_send_failure,
    middleware::auth::AuthUser,
    models::{Theme, UserSettings},
    response::{ApiResponse, Meta},
    services::{
        auth_service::{hash_password, verify_password},
        lookup::find_user,
        profile_service::remove_uploads,
    },
    state::AppState,
};

fn default_settings(user_id: Uuid) -> SettingsActive {
    let now = Utc::now().fixed_offset();
    SettingsActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        theme: Set(Theme::Light.as_str().to_string()),
        notifications: Set(true),
        email_visibility: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Settings row of `user_id`, created with defaults on first access.
async fn settings_for<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<SettingsModel> {
    if let Some(existing) = Settings::find()
        .filter(settings::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }
    tracing::debug!(user_id = %user_id, "creating default settings");
    Ok(default_settings(user_id).insert(db).await?)
}

pub async fn get_settings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserSettings>> {
    let settings = settings_for(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success(
        "OK",
        UserSettings::from(settings),
        Some(Meta::empty()),
    ))
}

pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateSettingsRequest,
) -> AppResult<ApiResponse<UserSettings>> {
    let current = settings_for(&state.orm, user.user_id).await?;
    let mut active = current.into_active_model();
    if let Some(theme) = payload.theme {
        active.theme = Set(theme.as_str().to_string());
    }
    if let Some(notifications) = payload.notifications {
        active.notifications = Set(notifications);
    }
    if let Some(visible) = payload.email_visibility {
        active.email_visibility = Set(visible);
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Settings updated successfully",
        UserSettings::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;
    let existing = find_user(&state.orm, user.user_id).await?;
    if !verify_password(&payload.current_password, &existing.password_hash)? {
        return Err(AppError::bad_request("Current password is incorrect"));
    }

    let mut active: UserActive = existing.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&state.orm).await?;

    tracing::info!(user_id = %user.user_id, "password changed");
    Ok(ApiResponse::success(
        "Password changed successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_notifications(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleNotificationsRequest,
) -> AppResult<ApiResponse<UserSettings>> {
    update_settings(
        state,
        user,
        UpdateSettingsRequest {
            notifications: Some(payload.notifications),
            ..Default::default()
        },
    )
    .await
}

pub async fn toggle_anonymous_comments(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleCommentsRequest,
) -> AppResult<ApiResponse<CommentsSetting>> {
    let existing = find_user(&state.orm, user.user_id).await?;
    let mut active: UserActive = existing.into();
    active.allow_comments = Set(payload.allow_comments);
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.orm).await?;

    let message = if updated.allow_comments {
        "Comments enabled on your profile"
    } else {
        "Comments disabled on your profile"
    };
    Ok(ApiResponse::success(
        message,
        CommentsSetting {
            id: updated.id,
            allow_comments: updated.allow_comments,
        },
        Some(Meta::empty()),
    ))
}

/// Removes the user and every row they own inside a single transaction.
pub async fn delete_account(
    state: &AppState,
    user: &AuthUser,
    payload: DeleteAccountRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.confirm_password.is_empty() {
        return Err(AppError::bad_request("Password confirmation is required"));
    }
    let me = user.user_id;
    let existing = find_user(&state.orm, me).await?;
    if !verify_password(&payload.confirm_password, &existing.password_hash)? {
        return Err(AppError::bad_request("Incorrect password"));
    }

    let txn = state.orm.begin().await?;

    let my_dates = BlindDates::find()
        .select_only()
        .column(blind_dates::Column::Id)
        .filter(
            Condition::any()
                .add(blind_dates::Column::InitiatorId.eq(me))
                .add(blind_dates::Column::ReceiverId.eq(me)),
        )
        .into_query();
    BlindDateMessages::delete_many()
        .filter(
            Condition::any()
                .add(blind_date_messages::Column::SenderId.eq(me))
                .add(blind_date_messages::Column::BlindDateId.in_subquery(my_dates)),
        )
        .exec(&txn)
        .await?;
    BlindDates::delete_many()
        .filter(
            Condition::any()
                .add(blind_dates::Column::InitiatorId.eq(me))
                .add(blind_dates::Column::ReceiverId.eq(me)),
        )
        .exec(&txn)
        .await?;
    Chats::delete_many()
        .filter(
            Condition::any()
                .add(chats::Column::SenderId.eq(me))
                .add(chats::Column::ReceiverId.eq(me)),
        )
        .exec(&txn)
        .await?;
    Comments::delete_many()
        .filter(
            Condition::any()
                .add(comments::Column::UserId.eq(me))
                .add(comments::Column::CommenterId.eq(me)),
        )
        .exec(&txn)
        .await?;
    Likes::delete_many()
        .filter(
            Condition::any()
                .add(likes::Column::LikerId.eq(me))
                .add(likes::Column::LikedId.eq(me)),
        )
        .exec(&txn)
        .await?;
    Passes::delete_many()
        .filter(
            Condition::any()
                .add(passes::Column::PasserId.eq(me))
                .add(passes::Column::PassedId.eq(me)),
        )
        .exec(&txn)
        .await?;
    Blocks::delete_many()
        .filter(
            Condition::any()
                .add(blocks::Column::BlockerId.eq(me))
                .add(blocks::Column::BlockedId.eq(me)),
        )
        .exec(&txn)
        .await?;
    Matches::delete_many()
        .filter(
            Condition::any()
                .add(matches::Column::User1Id.eq(me))
                .add(matches::Column::User2Id.eq(me)),
        )
        .exec(&txn)
        .await?;
    Notifications::delete_many()
        .filter(notifications::Column::UserId.eq(me))
        .exec(&txn)
        .await?;
    let photo_urls: Vec<String> = Photos::find()
        .select_only()
        .column(photos::Column::Url)
        .filter(photos::Column::UserId.eq(me))
        .into_tuple()
        .all(&txn)
        .await?;
    Photos::delete_many()
        .filter(photos::Column::UserId.eq(me))
        .exec(&txn)
        .await?;
    Settings::delete_many()
        .filter(settings::Column::UserId.eq(me))
        .exec(&txn)
        .await?;
    Users::delete_by_id(me).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(user_id = %me, "account deleted");
    remove_uploads(&state.config.upload_dir, &photo_urls).await;

    log_send_failure(
        state.mailer.send_account_deleted(&existing.email, &existing.name).await,
        "account deleted",
    );

    Ok(ApiResponse::success(
        "Account deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
