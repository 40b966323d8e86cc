mod common;

use campus_match_api::{
    dto::{matches::CommentRequest, profile::UpdateProfileRequest, settings::DeleteAccountRequest},
    error::AppError,
    models::{ConnectionIntent, PersonalityType},
    routes::params::Pagination,
    services::{
        match_service,
        profile_service::{self, UploadedImage, upload_path},
        settings_service,
    },
};
use common::{Student, create_student, database_url, setup_state, with_upload_dir};

fn png(n: u8) -> UploadedImage {
    UploadedImage {
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G', n],
    }
}

// Absent fields stay put; list fields take arrays or comma separated text.
#[tokio::test]
async fn partial_update_keeps_untouched_fields() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;
    let zoe = create_student(&state, Student::named("Zoe")).await?;

    let first: UpdateProfileRequest = serde_json::from_str(
        r#"{
            "age": 20,
            "about": "night owl",
            "personality_type": "INTROVERT",
            "interests": "chess, music ,, hiking",
            "connection_intent": "study_buddy"
        }"#,
    )?;
    let account = profile_service::update_profile(&state, &zoe, first)
        .await?
        .data
        .expect("account");
    assert_eq!(account.profile.interests, vec!["chess", "music", "hiking"]);
    assert_eq!(account.profile.connection_intent, Some(ConnectionIntent::StudyBuddy));

    let second: UpdateProfileRequest =
        serde_json::from_str(r#"{"current_mood": "sleepy", "campus_vibe_tags": ["library", "fests"]}"#)?;
    let account = profile_service::update_profile(&state, &zoe, second)
        .await?
        .data
        .expect("account");
    assert_eq!(account.profile.age, Some(20));
    assert_eq!(account.profile.about.as_deref(), Some("night owl"));
    assert_eq!(account.profile.personality_type, Some(PersonalityType::Introvert));
    assert_eq!(account.profile.interests.len(), 3);
    assert_eq!(account.profile.campus_vibe_tags, vec!["library", "fests"]);
    assert_eq!(account.profile.current_mood.as_deref(), Some("sleepy"));

    let json = serde_json::to_value(&account)?;
    assert_eq!(json["connection_intent"], "study_buddy");

    let too_young = profile_service::update_profile(
        &state,
        &zoe,
        UpdateProfileRequest {
            age: Some(12),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(too_young, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn uploads_enforce_count_and_type() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;
    let (state, dir) = with_upload_dir(state);
    let ada = create_student(&state, Student::named("Ada")).await?;

    let too_few = profile_service::upload_images(&state, &ada, vec![png(1), png(2)]).await;
    assert!(matches!(too_few, Err(AppError::BadRequest(_))));

    let too_many = profile_service::upload_images(&state, &ada, (0..7).map(png).collect()).await;
    assert!(matches!(too_many, Err(AppError::BadRequest(_))));

    let webp = UploadedImage {
        content_type: "image/webp".to_string(),
        bytes: vec![1, 2, 3],
    };
    let wrong_type = profile_service::upload_images(&state, &ada, vec![png(1), png(2), webp]).await;
    assert!(matches!(wrong_type, Err(AppError::BadRequest(msg)) if msg.starts_with("Invalid file type")));

    let photos = profile_service::upload_images(&state, &ada, vec![png(1), png(2), png(3)])
        .await?
        .data
        .expect("photos");
    assert_eq!(photos.len(), 3);
    assert_eq!(photos.iter().map(|p| p.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    let upload_dir = state.config.upload_dir.clone();
    for photo in &photos {
        let path = upload_path(&upload_dir, &photo.url).expect("local photo");
        assert!(path.exists(), "{} was not written", path.display());
    }

    // More photos are appended after the existing ones.
    let more = profile_service::upload_images(&state, &ada, vec![png(4), png(5), png(6)])
        .await?
        .data
        .expect("photos");
    assert_eq!(more[0].order, 3);

    // Deleting the account takes the files with it.
    settings_service::delete_account(
        &state,
        &ada,
        DeleteAccountRequest {
            confirm_password: "password123".into(),
        },
    )
    .await?;
    for photo in photos.iter().chain(&more) {
        let path = upload_path(&upload_dir, &photo.url).expect("local photo");
        assert!(!path.exists(), "{} survived account deletion", path.display());
    }

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn received_comments_hide_anonymous_authors() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;
    let host = create_student(&state, Student::named("Host")).await?;
    let shy = create_student(&state, Student::named("Shy")).await?;
    let open = create_student(&state, Student::named("Open")).await?;

    match_service::add_comment(
        &state,
        &shy,
        host.user_id,
        CommentRequest {
            content: "love the playlist".into(),
            anonymous: true,
        },
    )
    .await?;
    match_service::add_comment(
        &state,
        &open,
        host.user_id,
        CommentRequest {
            content: "see you at the fest".into(),
            anonymous: false,
        },
    )
    .await?;

    let comments = profile_service::received_comments(&state, &host, Pagination::default())
        .await?
        .data
        .expect("comments");
    assert_eq!(comments.len(), 2);
    let named: Vec<_> = comments.iter().filter_map(|c| c.commenter_id).collect();
    assert_eq!(named, vec![open.user_id]);
    assert!(comments.iter().any(|c| c.anonymous && c.commenter_id.is_none()));

    let second_page = profile_service::received_comments(&state, &host, Pagination::new(2, 20))
        .await?
        .data
        .expect("comments");
    assert!(second_page.is_empty());

    Ok(())
}
