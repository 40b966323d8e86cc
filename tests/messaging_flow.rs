mod common;

use campus_match_api::{
    dto::{
        matches::LikeRequest,
        messaging::SendMessageRequest,
        settings::{ChangePasswordRequest, DeleteAccountRequest, UpdateSettingsRequest},
    },
    entity::{Likes, Users},
    error::AppError,
    models::{ChatMessageType, Theme},
    routes::params::Pagination,
    services::{match_service, messaging_service, settings_service},
};
use common::{Student, create_student, database_url, setup_state};
use sea_orm::{EntityTrait, PaginatorTrait};

fn text(message: &str) -> SendMessageRequest {
    SendMessageRequest {
        message: message.to_string(),
        kind: ChatMessageType::Text,
        game_type: None,
        media_url: None,
    }
}

#[tokio::test]
async fn matched_users_can_chat_until_unmatched() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let sam = create_student(&state, Student::named("Sam")).await?;
    let tara = create_student(&state, Student::named("Tara")).await?;
    let stranger = create_student(&state, Student::named("Uma")).await?;

    match_service::like_profile(&state, &sam, tara.user_id, LikeRequest::default()).await?;
    match_service::like_profile(&state, &tara, sam.user_id, LikeRequest::default()).await?;

    let first = messaging_service::send_message(&state, &sam, tara.user_id, text("hi!"))
        .await?
        .data
        .expect("message");
    assert!(first.starter_prompt.is_some());
    let reply = messaging_service::send_message(&state, &tara, sam.user_id, text("hello"))
        .await?
        .data
        .expect("message");
    assert!(reply.starter_prompt.is_none());

    let blocked = messaging_service::send_message(&state, &sam, stranger.user_id, text("hey")).await;
    assert!(matches!(blocked, Err(AppError::Forbidden(_))));

    let inbox = messaging_service::conversations(&state, &tara)
        .await?
        .data
        .expect("conversations");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].unread_count, 1);

    let thread = messaging_service::messages(&state, &tara, sam.user_id, Pagination::default())
        .await?
        .data
        .expect("messages");
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].id, first.id);

    let inbox = messaging_service::conversations(&state, &tara)
        .await?
        .data
        .expect("conversations");
    assert_eq!(inbox[0].unread_count, 0);

    messaging_service::unmatch(&state, &tara, sam.user_id).await?;
    let after = messaging_service::send_message(&state, &sam, tara.user_id, text("?")).await;
    assert!(matches!(after, Err(AppError::Forbidden(_))));

    Ok(())
}

#[tokio::test]
async fn settings_defaults_password_change_and_account_deletion() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let vic = create_student(&state, Student::named("Vic")).await?;
    let other = create_student(&state, Student::named("Wes")).await?;
    match_service::like_profile(&state, &other, vic.user_id, LikeRequest::default()).await?;

    let defaults = settings_service::get_settings(&state, &vic)
        .await?
        .data
        .expect("settings");
    assert_eq!(defaults.theme, Theme::Light);
    assert!(defaults.notifications);

    let updated = settings_service::update_settings(
        &state,
        &vic,
        UpdateSettingsRequest {
            theme: Some(Theme::Dark),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("settings");
    assert_eq!(updated.theme, Theme::Dark);
    assert!(updated.email_visibility);

    let wrong = settings_service::change_password(
        &state,
        &vic,
        ChangePasswordRequest {
            current_password: "not-it".into(),
            new_password: "newpass1".into(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    settings_service::change_password(
        &state,
        &vic,
        ChangePasswordRequest {
            current_password: "password123".into(),
            new_password: "newpass1".into(),
        },
    )
    .await?;

    settings_service::delete_account(
        &state,
        &vic,
        DeleteAccountRequest {
            confirm_password: "newpass1".into(),
        },
    )
    .await?;

    assert!(Users::find_by_id(vic.user_id).one(&state.orm).await?.is_none());
    assert_eq!(Likes::find().count(&state.orm).await?, 0);

    Ok(())
}
