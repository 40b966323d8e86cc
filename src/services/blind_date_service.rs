//! Time-boxed anonymous pairings.
//!
//! A session belongs to exactly two users and stays active until it is ended
//! or its window passes. Expired sessions are closed lazily whenever one of
//! the participants touches them.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set,
    Statement, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    dto::blind_date::{
        BlindDateHistoryItem, BlindDateStarted, CurrentBlindDate, HistoryPartner, RevealOutcome,
        RevealedPartner, SendBlindDateMessageRequest,
    },
    entity::{
        BlindDateMessages, BlindDates, Blocks, Users,
        blind_date_messages::{ActiveModel as MessageActive, Column as MessageCol},
        blind_dates::{ActiveModel as DateActive, Column as DateCol, Model as DateModel},
        blocks::Column as BlockCol,
        users::Column as UserCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{BlindDateMessage, NotificationType},
    notifications::notify,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::lookup::{cover_photos, find_user, users_by_id},
    state::AppState,
};

/// Key of the transaction-scoped advisory lock that serializes pairing.
const PAIRING_LOCK_KEY: i64 = 0x626c_696e_6444;

const HISTORY_PAGE_SIZE: i64 = 10;
const HISTORY_MAX_PAGE_SIZE: i64 = 50;

fn participant(user_id: Uuid) -> Condition {
    Condition::any()
        .add(DateCol::InitiatorId.eq(user_id))
        .add(DateCol::ReceiverId.eq(user_id))
}

/// Marks every active session of `user_id` whose window has passed as ended.
async fn close_expired_for<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<u64> {
    let now = Utc::now();
    let result = BlindDates::update_many()
        .col_expr(DateCol::Active, Expr::value(false))
        .col_expr(DateCol::EndedAt, Expr::value(now.fixed_offset()))
        .filter(participant(user_id))
        .filter(DateCol::Active.eq(true))
        .filter(DateCol::ExpiresAt.lte(now))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        tracing::debug!(user_id = %user_id, closed = result.rows_affected, "closed expired blind dates");
    }
    Ok(result.rows_affected)
}

async fn close_session<C: ConnectionTrait>(db: &C, session: DateModel) -> AppResult<DateModel> {
    let mut active = session.into_active_model();
    active.active = Set(false);
    active.ended_at = Set(Some(Utc::now().fixed_offset()));
    Ok(active.update(db).await?)
}

fn expired() -> AppError {
    AppError::Gone("Blind date has expired".into())
}

async fn find_active_session<C: ConnectionTrait>(
    db: &C,
    session_id: Uuid,
    user_id: Uuid,
) -> AppResult<DateModel> {
    BlindDates::find_by_id(session_id)
        .filter(participant(user_id))
        .filter(DateCol::Active.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Blind date not found or inactive"))
}

/// Random verified user who is free, not the caller and not blocked either way.
async fn pick_partner<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Option<Uuid>> {
    let now = Utc::now();
    let busy_initiators = BlindDates::find()
        .select_only()
        .column(DateCol::InitiatorId)
        .filter(DateCol::Active.eq(true))
        .filter(DateCol::ExpiresAt.gt(now))
        .into_query();
    let busy_receivers = BlindDates::find()
        .select_only()
        .column(DateCol::ReceiverId)
        .filter(DateCol::Active.eq(true))
        .filter(DateCol::ExpiresAt.gt(now))
        .into_query();
    let blocked_by_me = Blocks::find()
        .select_only()
        .column(BlockCol::BlockedId)
        .filter(BlockCol::BlockerId.eq(user_id))
        .into_query();
    let blocked_me = Blocks::find()
        .select_only()
        .column(BlockCol::BlockerId)
        .filter(BlockCol::BlockedId.eq(user_id))
        .into_query();

    let candidate = Users::find()
        .select_only()
        .column(UserCol::Id)
        .filter(UserCol::Verified.eq(true))
        .filter(UserCol::Id.ne(user_id))
        .filter(UserCol::Id.not_in_subquery(busy_initiators))
        .filter(UserCol::Id.not_in_subquery(busy_receivers))
        .filter(UserCol::Id.not_in_subquery(blocked_by_me))
        .filter(UserCol::Id.not_in_subquery(blocked_me))
        .order_by(Expr::cust("RANDOM()"), Order::Asc)
        .into_tuple::<Uuid>()
        .one(db)
        .await?;
    Ok(candidate)
}

pub async fn start(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<BlindDateStarted>> {
    let me = user.user_id;
    let txn = state.orm.begin().await?;
    // One pairing at a time: the busy check and the insert must not interleave.
    txn.execute(Statement::from_string(
        txn.get_database_backend(),
        format!("SELECT pg_advisory_xact_lock({PAIRING_LOCK_KEY})"),
    ))
    .await?;
    close_expired_for(&txn, me).await?;

    let existing = BlindDates::find()
        .filter(participant(me))
        .filter(DateCol::Active.eq(true))
        .count(&txn)
        .await?;
    if existing > 0 {
        return Err(AppError::bad_request("You are already in an active blind date"));
    }

    let partner_id = pick_partner(&txn, me)
        .await?
        .ok_or_else(|| AppError::not_found("No available users for blind date at the moment"))?;

    let minutes = state.config.blind_date_minutes;
    let expires_at = Utc::now() + Duration::minutes(minutes);
    let session = DateActive {
        id: Set(Uuid::new_v4()),
        initiator_id: Set(me),
        receiver_id: Set(partner_id),
        duration: Set(minutes as i32),
        active: Set(true),
        initiator_agree_to_reveal: Set(false),
        receiver_agree_to_reveal: Set(false),
        both_agree_to_reveal: Set(false),
        revealed: Set(false),
        expires_at: Set(expires_at.fixed_offset()),
        ended_at: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(blind_date_id = %session.id, initiator_id = %me, receiver_id = %partner_id, "blind date started");
    notify(
        &state.orm,
        &[partner_id],
        NotificationType::BlindDate,
        &format!("You've been paired for a blind date! Chat anonymously for {minutes} minutes."),
    )
    .await;

    Ok(ApiResponse::success(
        "Blind date started successfully",
        BlindDateStarted {
            blind_date_id: session.id,
            partner_id: None,
            duration: session.duration,
            expires_at: session.expires_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn current(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CurrentBlindDate>> {
    let me = user.user_id;
    let session = BlindDates::find()
        .filter(participant(me))
        .filter(DateCol::Active.eq(true))
        .order_by_desc(DateCol::CreatedAt)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("No active blind date found"))?;

    let now = Utc::now();
    if session.is_expired_at(now) {
        close_session(&state.orm, session).await?;
        return Err(expired());
    }

    let messages = BlindDateMessages::find()
        .filter(MessageCol::BlindDateId.eq(session.id))
        .order_by_asc(MessageCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|m| BlindDateMessage::seen_by(m, me, session.revealed))
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CurrentBlindDate {
            blind_date_id: session.id,
            partner_id: session.revealed.then(|| session.partner_of(me)),
            time_remaining: session.seconds_remaining_at(now),
            revealed: session.revealed,
            can_reveal: session.both_agree_to_reveal,
            messages,
        },
        Some(Meta::empty()),
    ))
}

pub async fn send_message(
    state: &AppState,
    user: &AuthUser,
    payload: SendBlindDateMessageRequest,
) -> AppResult<ApiResponse<BlindDateMessage>> {
    let kind = payload
        .message_type()
        .ok_or_else(|| AppError::bad_request("Invalid message type"))?;
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("Message content is required"));
    }

    let session = find_active_session(&state.orm, payload.blind_date_id, user.user_id).await?;
    if session.is_expired_at(Utc::now()) {
        close_session(&state.orm, session).await?;
        return Err(expired());
    }

    let message = MessageActive {
        id: Set(Uuid::new_v4()),
        blind_date_id: Set(session.id),
        sender_id: Set(user.user_id),
        content: Set(content.to_string()),
        kind: Set(kind.as_str().to_string()),
        anonymous: Set(!session.revealed),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Message sent",
        BlindDateMessage::seen_by(message, user.user_id, session.revealed),
        Some(Meta::empty()),
    ))
}

pub async fn reveal(
    state: &AppState,
    user: &AuthUser,
    session_id: Uuid,
) -> AppResult<ApiResponse<RevealOutcome>> {
    let me = user.user_id;
    let txn = state.orm.begin().await?;
    let session = find_active_session(&txn, session_id, me).await?;
    let is_initiator = session.initiator_id == me;
    let partner_id = session.partner_of(me);

    let mut active = session.into_active_model();
    if is_initiator {
        active.initiator_agree_to_reveal = Set(true);
    } else {
        active.receiver_agree_to_reveal = Set(true);
    }
    let updated = active.update(&txn).await?;

    if !(updated.initiator_agree_to_reveal && updated.receiver_agree_to_reveal) {
        txn.commit().await?;
        return Ok(ApiResponse::success(
            "Waiting for your partner to agree to reveal identities",
            RevealOutcome {
                revealed: false,
                waiting_for_partner: true,
                partner: None,
            },
            Some(Meta::empty()),
        ));
    }

    let mut active = updated.into_active_model();
    active.revealed = Set(true);
    active.both_agree_to_reveal = Set(true);
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(blind_date_id = %session_id, "blind date revealed");
    notify(
        &state.orm,
        &[me, partner_id],
        NotificationType::BlindDateReveal,
        "Identities revealed! You can now see who you were chatting with.",
    )
    .await;

    let partner = find_user(&state.orm, partner_id).await?;
    let photo = cover_photos(&state.orm, &[partner_id]).await?.remove(&partner_id);
    Ok(ApiResponse::success(
        "Identities revealed!",
        RevealOutcome {
            revealed: true,
            waiting_for_partner: false,
            partner: Some(RevealedPartner {
                id: partner.id,
                name: partner.name,
                age: partner.age,
                about: partner.about,
                photo,
            }),
        },
        Some(Meta::empty()),
    ))
}

pub async fn end(
    state: &AppState,
    user: &AuthUser,
    session_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let session = BlindDates::find_by_id(session_id)
        .filter(participant(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Blind date not found"))?;

    if session.active {
        close_session(&state.orm, session).await?;
        tracing::info!(blind_date_id = %session_id, user_id = %user.user_id, "blind date ended");
    }

    Ok(ApiResponse::success(
        "Blind date ended",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn history(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<BlindDateHistoryItem>>> {
    let me = user.user_id;
    let (page, limit, offset) = pagination.normalize_with(HISTORY_PAGE_SIZE, HISTORY_MAX_PAGE_SIZE);

    let condition = Condition::all()
        .add(participant(me))
        .add(DateCol::Active.eq(false));
    let total = BlindDates::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await?;
    let sessions = BlindDates::find()
        .filter(condition)
        .order_by_desc(DateCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let revealed_partners: Vec<Uuid> = sessions
        .iter()
        .filter(|s| s.revealed)
        .map(|s| s.partner_of(me))
        .collect();
    let partners = users_by_id(&state.orm, &revealed_partners).await?;
    let photos = cover_photos(&state.orm, &revealed_partners).await?;

    let mut items = Vec::with_capacity(sessions.len());
    for session in sessions {
        let message_count = BlindDateMessages::find()
            .filter(MessageCol::BlindDateId.eq(session.id))
            .count(&state.orm)
            .await?;
        let partner = if session.revealed {
            let id = session.partner_of(me);
            partners.get(&id).map(|p| HistoryPartner {
                id,
                name: p.name.clone(),
                photo: photos.get(&id).cloned(),
            })
        } else {
            None
        };
        items.push(BlindDateHistoryItem {
            id: session.id,
            partner,
            duration: session.duration,
            revealed: session.revealed,
            message_count,
            created_at: session.created_at.with_timezone(&Utc),
            ended_at: session.ended_at.map(|t| t.with_timezone(&Utc)),
        });
    }

    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::new(page, limit, total as i64)),
    ))
}
