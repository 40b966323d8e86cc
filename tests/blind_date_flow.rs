mod common;

use campus_match_api::{
    dto::blind_date::SendBlindDateMessageRequest,
    entity::{
        BlindDates,
        blind_dates::{ActiveModel as DateActive, Column as DateCol},
    },
    error::AppError,
    routes::params::Pagination,
    services::blind_date_service,
};
use chrono::{Duration, Utc};
use common::{Student, create_student, database_url, setup_state};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

fn text(blind_date_id: uuid::Uuid, content: &str) -> SendBlindDateMessageRequest {
    SendBlindDateMessageRequest {
        blind_date_id,
        content: content.to_string(),
        kind: "TEXT".to_string(),
    }
}

#[tokio::test]
async fn pairing_chat_and_mutual_reveal() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let nia = create_student(&state, Student::named("Nia")).await?;
    let omar = create_student(&state, Student::named("Omar")).await?;

    let started = blind_date_service::start(&state, &nia)
        .await?
        .data
        .expect("session");
    // The pairing is anonymous; Omar is the only other student.
    assert_eq!(started.partner_id, None);
    assert_eq!(started.duration, 15);

    // Omar is now busy and so is Nia.
    let again = blind_date_service::start(&state, &omar).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    let sent = blind_date_service::send_message(&state, &omar, text(started.blind_date_id, "hey there"))
        .await?
        .data
        .expect("message");
    assert!(sent.anonymous);

    let video = SendBlindDateMessageRequest {
        kind: "VIDEO".to_string(),
        ..text(started.blind_date_id, "nope")
    };
    let rejected = blind_date_service::send_message(&state, &omar, video).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    let current = blind_date_service::current(&state, &nia)
        .await?
        .data
        .expect("current");
    assert_eq!(current.partner_id, None);
    assert_eq!(current.messages.len(), 1);
    assert_eq!(current.messages[0].sender_id, None);
    assert!(!current.messages[0].is_mine);
    assert!(current.time_remaining > 0 && current.time_remaining <= 15 * 60);

    let waiting = blind_date_service::reveal(&state, &nia, started.blind_date_id)
        .await?
        .data
        .expect("reveal");
    assert!(waiting.waiting_for_partner);
    assert!(waiting.partner.is_none());

    let revealed = blind_date_service::reveal(&state, &omar, started.blind_date_id)
        .await?
        .data
        .expect("reveal");
    assert!(revealed.revealed);
    assert_eq!(revealed.partner.expect("partner").id, nia.user_id);

    let after = blind_date_service::current(&state, &nia)
        .await?
        .data
        .expect("current");
    assert_eq!(after.partner_id, Some(omar.user_id));
    assert_eq!(after.messages[0].sender_id, Some(omar.user_id));

    blind_date_service::end(&state, &nia, started.blind_date_id).await?;
    let history = blind_date_service::history(&state, &omar, Pagination::default())
        .await?
        .data
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message_count, 1);
    assert_eq!(history[0].partner.as_ref().map(|p| p.id), Some(nia.user_id));

    Ok(())
}

#[tokio::test]
async fn expired_sessions_reject_messages_and_close() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let pia = create_student(&state, Student::named("Pia")).await?;
    create_student(&state, Student::named("Quinn")).await?;

    let started = blind_date_service::start(&state, &pia)
        .await?
        .data
        .expect("session");

    let session = BlindDates::find_by_id(started.blind_date_id)
        .one(&state.orm)
        .await?
        .expect("stored session");
    let mut active: DateActive = session.into();
    active.expires_at = Set((Utc::now() - Duration::minutes(1)).fixed_offset());
    active.update(&state.orm).await?;

    let late = blind_date_service::send_message(&state, &pia, text(started.blind_date_id, "still there?")).await;
    assert!(matches!(late, Err(AppError::Gone(_))));

    let stored = BlindDates::find_by_id(started.blind_date_id)
        .one(&state.orm)
        .await?
        .expect("stored session");
    assert!(!stored.active);
    assert!(stored.ended_at.is_some());

    let current = blind_date_service::current(&state, &pia).await;
    assert!(matches!(current, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn start_without_candidates_is_not_found() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let lonely = create_student(&state, Student::named("Ren")).await?;
    let result = blind_date_service::start(&state, &lonely).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

// Concurrent starts never put anyone in two live sessions.
#[tokio::test]
async fn concurrent_starts_pair_each_student_once() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let a = create_student(&state, Student::named("Tara")).await?;
    let b = create_student(&state, Student::named("Umar")).await?;
    let c = create_student(&state, Student::named("Vera")).await?;
    let d = create_student(&state, Student::named("Wade")).await?;

    let (ra, rb, rc, rd) = tokio::join!(
        blind_date_service::start(&state, &a),
        blind_date_service::start(&state, &b),
        blind_date_service::start(&state, &c),
        blind_date_service::start(&state, &d),
    );
    for result in [&ra, &rb, &rc, &rd] {
        if let Err(err) = result {
            assert!(
                matches!(err, AppError::BadRequest(_) | AppError::NotFound(_)),
                "unexpected error: {err}"
            );
        }
    }

    let sessions = BlindDates::find()
        .filter(DateCol::Active.eq(true))
        .all(&state.orm)
        .await?;
    assert!(!sessions.is_empty());
    for student in [&a, &b, &c, &d] {
        let seats = sessions
            .iter()
            .filter(|s| s.initiator_id == student.user_id || s.receiver_id == student.user_id)
            .count();
        assert!(seats <= 1, "a student sits in {seats} live blind dates");
    }

    Ok(())
}
