use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::seq::SliceRandom;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::messaging::{ChatClaims, ChatToken, Conversation, SendMessageRequest},
    entity::{
        Chats, Matches,
        chats::{ActiveModel as ChatActive, Column as ChatCol},
        matches::{Column as MatchCol, Model as MatchModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ChatMessage, ChatMessageType, NotificationType, UserSummary},
    notifications::notify,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::lookup::{cover_photos, find_user, users_by_id},
    state::AppState,
};

const MESSAGES_PAGE_SIZE: i64 = 50;
const MESSAGES_MAX_PAGE_SIZE: i64 = 200;

pub const ICE_BREAKER_PROMPTS: &[&str] = &[
    "What's the best spot on campus to kill an hour between classes?",
    "Which course would you drop right now if you could?",
    "Describe your ideal weekend in three emojis.",
    "What song have you had on repeat this week?",
    "Canteen food: underrated or overrated?",
    "Night owl or early bird during exam season?",
    "What's a club or fest you'd never miss?",
    "If you could swap majors for a day, which one would you pick?",
    "What's the most spontaneous thing you've done this semester?",
    "Coffee, chai or energy drinks before an 8am lecture?",
];

fn random_prompt() -> Option<String> {
    ICE_BREAKER_PROMPTS
        .choose(&mut rand::thread_rng())
        .map(|p| p.to_string())
}

fn between(a: Uuid, b: Uuid) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(ChatCol::SenderId.eq(a))
                .add(ChatCol::ReceiverId.eq(b)),
        )
        .add(
            Condition::all()
                .add(ChatCol::SenderId.eq(b))
                .add(ChatCol::ReceiverId.eq(a)),
        )
}

fn match_between(a: Uuid, b: Uuid) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(MatchCol::User1Id.eq(a))
                .add(MatchCol::User2Id.eq(b)),
        )
        .add(
            Condition::all()
                .add(MatchCol::User1Id.eq(b))
                .add(MatchCol::User2Id.eq(a)),
        )
}

async fn open_match(state: &AppState, me: Uuid, other: Uuid) -> AppResult<MatchModel> {
    Matches::find()
        .filter(match_between(me, other))
        .filter(MatchCol::IsActive.eq(true))
        .filter(MatchCol::MatchExpired.eq(false))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::forbidden("You can only message your matches"))
}

/// One entry per live match, most recently active first.
pub async fn conversations(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<Conversation>>> {
    let me = user.user_id;
    let matches = Matches::find()
        .filter(
            Condition::any()
                .add(MatchCol::User1Id.eq(me))
                .add(MatchCol::User2Id.eq(me)),
        )
        .filter(MatchCol::IsActive.eq(true))
        .filter(MatchCol::MatchExpired.eq(false))
        .all(&state.orm)
        .await?;

    let other_ids: Vec<Uuid> = matches.iter().map(|m| m.other(me)).collect();
    let users = users_by_id(&state.orm, &other_ids).await?;
    let mut covers = cover_photos(&state.orm, &other_ids).await?;

    let mut conversations = Vec::with_capacity(matches.len());
    for m in matches {
        let other = m.other(me);
        let Some(profile) = users.get(&other) else {
            continue;
        };
        let last_message = Chats::find()
            .filter(between(me, other))
            .order_by_desc(ChatCol::CreatedAt)
            .one(&state.orm)
            .await?
            .map(ChatMessage::from);
        let unread_count = Chats::find()
            .filter(ChatCol::SenderId.eq(other))
            .filter(ChatCol::ReceiverId.eq(me))
            .filter(ChatCol::IsRead.eq(false))
            .count(&state.orm)
            .await?;
        conversations.push(Conversation {
            match_id: m.id,
            user: UserSummary::new(profile, covers.remove(&other)),
            last_message,
            unread_count,
            created_at: m.created_at.with_timezone(&Utc),
        });
    }
    conversations.sort_by_key(|c| std::cmp::Reverse(c.last_activity()));

    Ok(ApiResponse::success("OK", conversations, Some(Meta::empty())))
}

pub async fn messages(
    state: &AppState,
    user: &AuthUser,
    other_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<ChatMessage>>> {
    let me = user.user_id;
    Matches::find()
        .filter(match_between(me, other_id))
        .filter(MatchCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::forbidden("You can only view messages with your matches"))?;

    let (page, limit, offset) =
        pagination.normalize_with(MESSAGES_PAGE_SIZE, MESSAGES_MAX_PAGE_SIZE);
    let mut page_rows = Chats::find()
        .filter(between(me, other_id))
        .order_by_desc(ChatCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    page_rows.reverse();

    let marked = Chats::update_many()
        .col_expr(ChatCol::IsRead, Expr::value(true))
        .filter(ChatCol::SenderId.eq(other_id))
        .filter(ChatCol::ReceiverId.eq(me))
        .filter(ChatCol::IsRead.eq(false))
        .exec(&state.orm)
        .await?;
    tracing::debug!(user_id = %me, partner_id = %other_id, marked = marked.rows_affected, "messages marked read");

    let returned = page_rows.len();
    let messages = page_rows.into_iter().map(ChatMessage::from).collect();
    Ok(ApiResponse::success(
        "OK",
        messages,
        Some(Meta::page_only(page, limit, returned)),
    ))
}

pub async fn send_message(
    state: &AppState,
    user: &AuthUser,
    receiver_id: Uuid,
    payload: SendMessageRequest,
) -> AppResult<ApiResponse<ChatMessage>> {
    payload.validate()?;
    let me = user.user_id;
    if receiver_id == me {
        return Err(AppError::bad_request("Cannot message yourself"));
    }
    let has_media = payload.media_url.as_deref().is_some_and(|u| !u.trim().is_empty());
    if payload.kind == ChatMessageType::Text && payload.message.trim().is_empty() {
        return Err(AppError::bad_request("Message is required"));
    }
    if matches!(
        payload.kind,
        ChatMessageType::Image | ChatMessageType::Voice | ChatMessageType::Video
    ) && !has_media
    {
        return Err(AppError::bad_request("Media URL is required for this message type"));
    }

    open_match(state, me, receiver_id).await?;

    let previous = Chats::find()
        .filter(between(me, receiver_id))
        .count(&state.orm)
        .await?;
    let starter_prompt = if previous == 0 { random_prompt() } else { None };

    let chat = ChatActive {
        id: Set(Uuid::new_v4()),
        sender_id: Set(me),
        receiver_id: Set(receiver_id),
        message: Set(payload.message),
        kind: Set(payload.kind.as_str().to_string()),
        game_type: Set(payload.game_type),
        starter_prompt: Set(starter_prompt),
        media_url: Set(payload.media_url.filter(|_| has_media)),
        is_read: Set(false),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    notify(
        &state.orm,
        &[receiver_id],
        NotificationType::Message,
        "You have a new message! 💬",
    )
    .await;

    Ok(ApiResponse::success(
        "Message sent successfully",
        ChatMessage::from(chat),
        Some(Meta::empty()),
    ))
}

/// Deactivates the match; the chat history is kept.
pub async fn unmatch(
    state: &AppState,
    user: &AuthUser,
    other_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let found = Matches::find()
        .filter(match_between(user.user_id, other_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Match not found"))?;

    let mut active = found.into_active_model();
    active.is_active = Set(false);
    active.update(&state.orm).await?;

    tracing::info!(user_id = %user.user_id, partner_id = %other_id, "match deactivated");
    Ok(ApiResponse::success(
        "User unmatched successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Signs a user token for the hosted chat service.
pub async fn chat_token(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ChatToken>> {
    let (Some(api_key), Some(api_secret)) = (
        state.config.chat.api_key.clone(),
        state.config.chat.api_secret.as_deref(),
    ) else {
        return Err(AppError::internal("Chat service is not configured"));
    };
    find_user(&state.orm, user.user_id).await?;

    let claims = ChatClaims {
        user_id: user.user_id.to_string(),
        iat: Utc::now().timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(ApiResponse::success(
        "OK",
        ChatToken {
            user_id: user.user_id,
            api_key,
            token,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_prompt_comes_from_the_list() {
        let prompt = random_prompt().unwrap();
        assert!(ICE_BREAKER_PROMPTS.contains(&prompt.as_str()));
    }
}
