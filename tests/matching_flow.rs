mod common;

use campus_match_api::{
    dto::matches::{CommentRequest, DiscoverQuery, LikeRequest, MatchListQuery},
    entity::{
        Matches, Notifications, Users,
        matches::{ActiveModel as MatchActive, Column as MatchCol},
        notifications::Column as NotificationCol,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    models::PersonalityType,
    services::match_service,
};
use common::{Student, create_student, database_url, setup_state};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

// Mutual likes create exactly one scored match and notify both sides.
#[tokio::test]
async fn mutual_like_creates_a_scored_match() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let asha = create_student(
        &state,
        Student {
            name: "Asha",
            age: Some(20),
            personality: Some(PersonalityType::Introvert),
            interests: &["music", "chess"],
        },
    )
    .await?;
    let ravi = create_student(
        &state,
        Student {
            name: "Ravi",
            age: Some(21),
            personality: Some(PersonalityType::Extrovert),
            interests: &["music", "football"],
        },
    )
    .await?;

    let first = match_service::like_profile(&state, &asha, ravi.user_id, LikeRequest::default())
        .await?
        .data
        .expect("like outcome");
    assert!(!first.is_match);
    assert!(first.matched.is_none());

    let again = match_service::like_profile(&state, &asha, ravi.user_id, LikeRequest::default()).await;
    assert!(matches!(again, Err(AppError::BadRequest(msg)) if msg == "Profile already liked"));

    let second = match_service::like_profile(&state, &ravi, asha.user_id, LikeRequest::default())
        .await?
        .data
        .expect("like outcome");
    assert!(second.is_match);
    let matched = second.matched.expect("match");
    // interests 1/2 * 40 = 20, introvert/extrovert 30, one year apart 30
    assert_eq!(matched.compatibility, 80);

    assert_eq!(Matches::find().count(&state.orm).await?, 1);
    let match_notifications = Notifications::find()
        .filter(NotificationCol::Kind.eq("MATCH"))
        .count(&state.orm)
        .await?;
    assert_eq!(match_notifications, 2);

    let listed = match_service::list_matches(&state, &asha, MatchListQuery { in_detail: false })
        .await?
        .data
        .expect("matches");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].compatibility, 80);

    Ok(())
}

#[tokio::test]
async fn feed_hides_liked_passed_and_blocked_profiles() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let me = create_student(&state, Student::named("Maya")).await?;
    let liked = create_student(&state, Student::named("Liam")).await?;
    let passed = create_student(&state, Student::named("Pia")).await?;
    let blocker = create_student(&state, Student::named("Bo")).await?;
    let fresh = create_student(&state, Student::named("Fin")).await?;

    let feed_ids = |profiles: Vec<campus_match_api::models::PublicProfile>| {
        profiles.into_iter().map(|p| p.id).collect::<Vec<_>>()
    };

    let before = match_service::discover_profiles(&state, &me, DiscoverQuery::default())
        .await?
        .data
        .expect("feed");
    assert_eq!(before.len(), 4);

    match_service::like_profile(&state, &me, liked.user_id, LikeRequest::default()).await?;
    match_service::pass_profile(&state, &me, passed.user_id).await?;
    // passing twice is harmless
    match_service::pass_profile(&state, &me, passed.user_id).await?;
    match_service::block_profile(&state, &blocker, me.user_id).await?;

    let after = match_service::discover_profiles(&state, &me, DiscoverQuery::default())
        .await?
        .data
        .expect("feed");
    assert_eq!(feed_ids(after), vec![fresh.user_id]);

    let blocked_like =
        match_service::like_profile(&state, &me, blocker.user_id, LikeRequest::default()).await;
    assert!(matches!(blocked_like, Err(AppError::Forbidden(_))));

    Ok(())
}

// Filter text is matched literally; gender compares case-insensitively.
#[tokio::test]
async fn feed_filters_treat_input_literally() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let me = create_student(&state, Student::named("Quinn")).await?;
    let exact = create_student(&state, Student::named("Rhea")).await?;
    let lookalike = create_student(&state, Student::named("Sami")).await?;
    for (student, college, gender) in [
        (&exact, "Arts_College", "Female"),
        (&lookalike, "ArtsXCollege", "female-ish"),
    ] {
        let user = Users::find_by_id(student.user_id).one(&state.orm).await?.expect("user");
        let mut active: UserActive = user.into();
        active.college = Set(college.to_string());
        active.gender = Set(Some(gender.to_string()));
        active.update(&state.orm).await?;
    }

    let feed = |query: DiscoverQuery| {
        let state = state.clone();
        let me = me.clone();
        async move {
            let profiles = match_service::discover_profiles(&state, &me, query)
                .await?
                .data
                .expect("feed");
            anyhow::Ok(profiles.into_iter().map(|p| p.id).collect::<Vec<_>>())
        }
    };

    let by_college = feed(DiscoverQuery {
        college: Some("arts_college".into()),
        ..Default::default()
    })
    .await?;
    assert_eq!(by_college, vec![exact.user_id]);

    let wildcard = feed(DiscoverQuery {
        college: Some("%".into()),
        ..Default::default()
    })
    .await?;
    assert!(wildcard.is_empty());

    let by_gender = feed(DiscoverQuery {
        gender: Some("FEMALE".into()),
        ..Default::default()
    })
    .await?;
    assert_eq!(by_gender, vec![exact.user_id]);

    let gender_pattern = feed(DiscoverQuery {
        gender: Some("fem%".into()),
        ..Default::default()
    })
    .await?;
    assert!(gender_pattern.is_empty());

    Ok(())
}

// Two students liking each other at the same moment still end up matched once.
#[tokio::test]
async fn simultaneous_mutual_likes_create_one_match() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    for round in 0..5 {
        let a = create_student(&state, Student::named(&format!("Mira{round}"))).await?;
        let b = create_student(&state, Student::named(&format!("Noel{round}"))).await?;

        let (left, right) = tokio::join!(
            match_service::like_profile(&state, &a, b.user_id, LikeRequest::default()),
            match_service::like_profile(&state, &b, a.user_id, LikeRequest::default()),
        );
        let left = left?.data.expect("like outcome");
        let right = right?.data.expect("like outcome");
        assert!(left.is_match ^ right.is_match, "exactly one like reports the match");

        let pair_matches = Matches::find()
            .filter(MatchCol::User1Id.is_in([a.user_id, b.user_id]))
            .filter(MatchCol::User2Id.is_in([a.user_id, b.user_id]))
            .count(&state.orm)
            .await?;
        assert_eq!(pair_matches, 1);
    }

    Ok(())
}

#[tokio::test]
async fn second_active_match_for_a_pair_is_refused() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let a = create_student(&state, Student::named("Ivy")).await?;
    let b = create_student(&state, Student::named("Jon")).await?;
    match_service::like_profile(&state, &a, b.user_id, LikeRequest::default()).await?;
    match_service::like_profile(&state, &b, a.user_id, LikeRequest::default()).await?;

    let duplicate = MatchActive {
        id: Set(Uuid::new_v4()),
        user1_id: Set(b.user_id),
        user2_id: Set(a.user_id),
        compatibility: Set(0),
        is_active: Set(true),
        match_expired: Set(false),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await;
    assert!(duplicate.is_err());

    Ok(())
}

#[tokio::test]
async fn blocking_removes_the_match() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let a = create_student(&state, Student::named("Ana")).await?;
    let b = create_student(&state, Student::named("Ben")).await?;
    match_service::like_profile(&state, &a, b.user_id, LikeRequest::default()).await?;
    match_service::like_profile(&state, &b, a.user_id, LikeRequest::default()).await?;
    assert_eq!(Matches::find().count(&state.orm).await?, 1);

    match_service::block_profile(&state, &a, b.user_id).await?;
    assert_eq!(Matches::find().count(&state.orm).await?, 0);

    let twice = match_service::block_profile(&state, &a, b.user_id).await;
    assert!(matches!(twice, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn comments_respect_the_profile_setting() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let (state, _guard) = setup_state(&url).await?;

    let author = create_student(&state, Student::named("Cal")).await?;
    let target = create_student(&state, Student::named("Dee")).await?;

    let comment = match_service::add_comment(
        &state,
        &author,
        target.user_id,
        CommentRequest {
            content: "  love your playlist  ".into(),
            anonymous: true,
        },
    )
    .await?
    .data
    .expect("comment");
    assert_eq!(comment.content, "love your playlist");
    assert!(comment.commenter_id.is_none());

    campus_match_api::services::settings_service::toggle_anonymous_comments(
        &state,
        &target,
        campus_match_api::dto::settings::ToggleCommentsRequest {
            allow_comments: false,
        },
    )
    .await?;

    let rejected = match_service::add_comment(
        &state,
        &author,
        target.user_id,
        CommentRequest {
            content: "hello".into(),
            anonymous: false,
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Forbidden(_))));

    Ok(())
}
