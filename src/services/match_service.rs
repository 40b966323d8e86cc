use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, SqlErr,
    TransactionTrait,
    sea_query::{Expr, Func, OnConflict, extension::postgres::PgExpr},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    compatibility,
    dto::matches::{
        CommentRequest, CompatibilityResponse, DiscoverQuery, LikeOutcome, LikeRequest,
        MatchListQuery, MatchView, MatchedUser,
    },
    entity::{
        Blocks, Likes, Matches, Passes, Users,
        blocks::{ActiveModel as BlockActive, Column as BlockCol},
        comments::ActiveModel as CommentActive,
        likes::{ActiveModel as LikeActive, Column as LikeCol},
        matches::{ActiveModel as MatchActive, Column as MatchCol, Model as MatchModel},
        passes::{ActiveModel as PassActive, Column as PassCol},
        users::{Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Comment, Like, Match, NotificationType, PersonalityType, PublicProfile, UserSummary},
    notifications::notify,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::lookup::{cover_photos, find_user, photos_by_user, users_by_id},
    state::AppState,
};

const FEED_PAGE_SIZE: i64 = 10;
const FEED_MAX_PAGE_SIZE: i64 = 50;

/// Escapes `LIKE` wildcards so user text only ever matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Condition matching rows between `a` and `b` in either direction.
fn pair_condition<C: ColumnTrait>(left: C, right: C, a: Uuid, b: Uuid) -> Condition {
    Condition::any()
        .add(Condition::all().add(left.eq(a)).add(right.eq(b)))
        .add(Condition::all().add(left.eq(b)).add(right.eq(a)))
}

pub async fn is_blocked_between<C: ConnectionTrait>(db: &C, a: Uuid, b: Uuid) -> AppResult<bool> {
    let count = Blocks::find()
        .filter(pair_condition(BlockCol::BlockerId, BlockCol::BlockedId, a, b))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub async fn active_match_between<C: ConnectionTrait>(
    db: &C,
    a: Uuid,
    b: Uuid,
) -> AppResult<Option<MatchModel>> {
    Ok(Matches::find()
        .filter(pair_condition(MatchCol::User1Id, MatchCol::User2Id, a, b))
        .filter(MatchCol::IsActive.eq(true))
        .one(db)
        .await?)
}

/// Verified students the caller has not liked, passed or blocked, newest first.
pub async fn discover_profiles(
    state: &AppState,
    user: &AuthUser,
    query: DiscoverQuery,
) -> AppResult<ApiResponse<Vec<PublicProfile>>> {
    let (page, limit, offset) = Pagination {
        page: query.page,
        limit: query.limit,
    }
    .normalize_with(FEED_PAGE_SIZE, FEED_MAX_PAGE_SIZE);
    let me = user.user_id;

    let liked = Likes::find()
        .select_only()
        .column(LikeCol::LikedId)
        .filter(LikeCol::LikerId.eq(me))
        .into_query();
    let passed = Passes::find()
        .select_only()
        .column(PassCol::PassedId)
        .filter(PassCol::PasserId.eq(me))
        .into_query();
    let blocked_by_me = Blocks::find()
        .select_only()
        .column(BlockCol::BlockedId)
        .filter(BlockCol::BlockerId.eq(me))
        .into_query();
    let blocked_me = Blocks::find()
        .select_only()
        .column(BlockCol::BlockerId)
        .filter(BlockCol::BlockedId.eq(me))
        .into_query();

    let mut condition = Condition::all()
        .add(UserCol::Verified.eq(true))
        .add(UserCol::Id.ne(me))
        .add(UserCol::Id.not_in_subquery(liked))
        .add(UserCol::Id.not_in_subquery(passed))
        .add(UserCol::Id.not_in_subquery(blocked_by_me))
        .add(UserCol::Id.not_in_subquery(blocked_me));

    if let Some(college) = query.college.as_ref().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        let pattern = format!("%{}%", escape_like(college));
        condition = condition.add(Expr::col(UserCol::College).ilike(pattern));
    }
    if let Some(min_age) = query.min_age {
        condition = condition.add(UserCol::Age.gte(min_age));
    }
    if let Some(max_age) = query.max_age {
        condition = condition.add(UserCol::Age.lte(max_age));
    }
    if let Some(gender) = query.gender.as_ref().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        condition = condition
            .add(Expr::expr(Func::lower(Expr::col(UserCol::Gender))).eq(gender.to_lowercase()));
    }
    let personalities = query.personality_filter();
    if !personalities.is_empty() {
        condition = condition.add(
            UserCol::PersonalityType.is_in(personalities.iter().map(PersonalityType::as_str)),
        );
    }

    let users = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let mut photos = photos_by_user(&state.orm, &ids).await?;
    let returned = users.len();
    let profiles = users
        .into_iter()
        .map(|u| {
            let own = photos.remove(&u.id).unwrap_or_default();
            PublicProfile::new(u, own)
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        profiles,
        Some(Meta::page_only(page, limit, returned)),
    ))
}

/// Row-locks both users in id order. Likes between the same pair then run
/// one after the other, so the second sees the first's like.
async fn lock_pair<C: ConnectionTrait>(db: &C, a: Uuid, b: Uuid) -> AppResult<()> {
    let (first, second) = if a < b { (a, b) } else { (b, a) };
    for id in [first, second] {
        Users::find_by_id(id).lock_exclusive().one(db).await?;
    }
    Ok(())
}

fn already_liked(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::bad_request("Profile already liked"),
        _ => err.into(),
    }
}

pub async fn like_profile(
    state: &AppState,
    user: &AuthUser,
    profile_id: Uuid,
    payload: LikeRequest,
) -> AppResult<ApiResponse<LikeOutcome>> {
    payload.validate()?;
    let me = user.user_id;
    if profile_id == me {
        return Err(AppError::bad_request("Cannot like your own profile"));
    }

    let liker = find_user(&state.orm, me).await?;
    let target = find_user(&state.orm, profile_id).await?;

    if is_blocked_between(&state.orm, me, profile_id).await? {
        return Err(AppError::forbidden("You cannot interact with this profile"));
    }

    let txn = state.orm.begin().await?;
    lock_pair(&txn, me, profile_id).await?;

    let existing = Likes::find()
        .filter(LikeCol::LikerId.eq(me))
        .filter(LikeCol::LikedId.eq(profile_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::bad_request("Profile already liked"));
    }

    let like = LikeActive {
        id: Set(Uuid::new_v4()),
        liker_id: Set(me),
        liked_id: Set(profile_id),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(already_liked)?;

    let liked_back = Likes::find()
        .filter(LikeCol::LikerId.eq(profile_id))
        .filter(LikeCol::LikedId.eq(me))
        .one(&txn)
        .await?
        .is_some();

    let matched = if liked_back && active_match_between(&txn, me, profile_id).await?.is_none() {
        let score = compatibility::between(&liker, &target);
        let created = MatchActive {
            id: Set(Uuid::new_v4()),
            user1_id: Set(me),
            user2_id: Set(profile_id),
            compatibility: Set(i32::from(score)),
            is_active: Set(true),
            match_expired: Set(false),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        Some(created)
    } else {
        None
    };

    let whisper = match payload.whisper.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        Some(text) if target.allow_comments => {
            Some(insert_comment(&txn, profile_id, me, text, payload.anonymous).await?)
        }
        Some(_) => {
            tracing::debug!(target_id = %profile_id, "whisper dropped, comments disabled");
            None
        }
        None => None,
    };

    txn.commit().await?;

    tracing::info!(liker_id = %me, liked_id = %profile_id, "profile liked");
    if whisper.is_some() {
        notify(
            &state.orm,
            &[profile_id],
            NotificationType::Comment,
            "Someone whispered on your profile!",
        )
        .await;
    }
    if let Some(m) = &matched {
        tracing::info!(match_id = %m.id, compatibility = m.compatibility, "match created");
        notify(&state.orm, &[me, profile_id], NotificationType::Match, "You have a new match!").await;
    }

    let is_match = matched.is_some();
    let outcome = LikeOutcome {
        like: Like::from(like),
        matched: matched.map(Match::from),
        is_match,
        whisper,
    };
    let message = if is_match { "It's a match!" } else { "Profile liked" };
    Ok(ApiResponse::success(message, outcome, Some(Meta::empty())))
}

pub async fn pass_profile(
    state: &AppState,
    user: &AuthUser,
    profile_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if profile_id == user.user_id {
        return Err(AppError::bad_request("Cannot pass your own profile"));
    }
    find_user(&state.orm, profile_id).await?;

    let pass = PassActive {
        id: Set(Uuid::new_v4()),
        passer_id: Set(user.user_id),
        passed_id: Set(profile_id),
        created_at: NotSet,
    };
    Passes::insert(pass)
        .on_conflict(
            OnConflict::columns([PassCol::PasserId, PassCol::PassedId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Profile passed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Records the block and removes every like and match between the pair.
pub async fn block_profile(
    state: &AppState,
    user: &AuthUser,
    profile_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let me = user.user_id;
    if profile_id == me {
        return Err(AppError::bad_request("Cannot block yourself"));
    }
    find_user(&state.orm, profile_id).await?;

    let txn = state.orm.begin().await?;
    let existing = Blocks::find()
        .filter(BlockCol::BlockerId.eq(me))
        .filter(BlockCol::BlockedId.eq(profile_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::bad_request("Profile already blocked"));
    }

    BlockActive {
        id: Set(Uuid::new_v4()),
        blocker_id: Set(me),
        blocked_id: Set(profile_id),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    Likes::delete_many()
        .filter(pair_condition(LikeCol::LikerId, LikeCol::LikedId, me, profile_id))
        .exec(&txn)
        .await?;
    Matches::delete_many()
        .filter(pair_condition(MatchCol::User1Id, MatchCol::User2Id, me, profile_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(blocker_id = %me, blocked_id = %profile_id, "profile blocked");
    notify(
        &state.orm,
        &[profile_id],
        NotificationType::Block,
        "A connection was removed. You won't see their profile anymore.",
    )
    .await;

    Ok(ApiResponse::success(
        "Profile blocked successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn unmatch(
    state: &AppState,
    user: &AuthUser,
    match_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let found = Matches::find_by_id(match_id)
        .one(&state.orm)
        .await?
        .filter(|m| m.involves(user.user_id))
        .ok_or_else(|| AppError::not_found("Match not found"))?;

    let other = found.other(user.user_id);
    Matches::delete_by_id(found.id).exec(&state.orm).await?;

    tracing::info!(match_id = %match_id, user_id = %user.user_id, "match removed");
    notify(
        &state.orm,
        &[other],
        NotificationType::Match,
        "One of your matches has unmatched.",
    )
    .await;

    Ok(ApiResponse::success(
        "Unmatched successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn insert_comment<C: ConnectionTrait>(
    db: &C,
    profile_id: Uuid,
    commenter_id: Uuid,
    content: &str,
    anonymous: bool,
) -> AppResult<Comment> {
    let comment = CommentActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(profile_id),
        commenter_id: Set(commenter_id),
        content: Set(content.to_string()),
        anonymous: Set(anonymous),
        created_at: NotSet,
    }
    .insert(db)
    .await?;
    Ok(Comment::from(comment))
}

pub async fn add_comment(
    state: &AppState,
    user: &AuthUser,
    profile_id: Uuid,
    mut payload: CommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    payload.content = payload.content.trim().to_string();
    if payload.content.is_empty() {
        return Err(AppError::bad_request("Comment content is required"));
    }
    payload.validate()?;
    if profile_id == user.user_id {
        return Err(AppError::bad_request("Cannot comment on your own profile"));
    }

    let target = Users::find_by_id(profile_id).one(&state.orm).await?;
    match target {
        Some(t) if t.allow_comments => {}
        _ => return Err(AppError::forbidden("Comments are not allowed on this profile")),
    }
    if is_blocked_between(&state.orm, user.user_id, profile_id).await? {
        return Err(AppError::forbidden("Comments are not allowed on this profile"));
    }

    let comment = insert_comment(
        &state.orm,
        profile_id,
        user.user_id,
        &payload.content,
        payload.anonymous,
    )
    .await?;

    notify(
        &state.orm,
        &[profile_id],
        NotificationType::Comment,
        "Someone left a comment on your profile!",
    )
    .await;

    Ok(ApiResponse::success(
        "Comment added successfully",
        comment,
        Some(Meta::empty()),
    ))
}

pub async fn list_matches(
    state: &AppState,
    user: &AuthUser,
    query: MatchListQuery,
) -> AppResult<ApiResponse<Vec<MatchView>>> {
    let me = user.user_id;
    let matches = Matches::find()
        .filter(
            Condition::any()
                .add(MatchCol::User1Id.eq(me))
                .add(MatchCol::User2Id.eq(me)),
        )
        .filter(MatchCol::IsActive.eq(true))
        .order_by_desc(MatchCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let other_ids: Vec<Uuid> = matches.iter().map(|m| m.other(me)).collect();
    let mut users = users_by_id(&state.orm, &other_ids).await?;

    let views = if query.in_detail {
        let mut photos = photos_by_user(&state.orm, &other_ids).await?;
        matches
            .into_iter()
            .filter_map(|m| {
                let other = m.other(me);
                let profile = users.remove(&other)?;
                let own = photos.remove(&other).unwrap_or_default();
                Some(match_view(&m, MatchedUser::Detailed(PublicProfile::new(profile, own))))
            })
            .collect()
    } else {
        let mut covers = cover_photos(&state.orm, &other_ids).await?;
        matches
            .into_iter()
            .filter_map(|m| {
                let other = m.other(me);
                let profile = users.get(&other)?;
                let summary = UserSummary::new(profile, covers.remove(&other));
                Some(match_view(&m, MatchedUser::Brief(summary)))
            })
            .collect()
    };

    Ok(ApiResponse::success("OK", views, Some(Meta::empty())))
}

fn match_view(m: &MatchModel, user: MatchedUser) -> MatchView {
    MatchView {
        id: m.id,
        compatibility: m.compatibility,
        created_at: m.created_at.with_timezone(&chrono::Utc),
        user,
    }
}

pub async fn compatibility_with(
    state: &AppState,
    user: &AuthUser,
    other_id: Uuid,
) -> AppResult<ApiResponse<CompatibilityResponse>> {
    let me: UserModel = find_user(&state.orm, user.user_id).await?;
    let other = find_user(&state.orm, other_id).await?;
    let score = compatibility::between(&me, &other);
    Ok(ApiResponse::success(
        "OK",
        CompatibilityResponse {
            user_id: other_id,
            compatibility: score,
        },
        Some(Meta::empty()),
    ))
}
