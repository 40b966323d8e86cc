use sea_orm::{ActiveValue::NotSet, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    entity::{Notifications, notifications::ActiveModel},
    error::AppResult,
    models::NotificationType,
};

pub async fn create_notifications<C: ConnectionTrait>(
    db: &C,
    user_ids: &[Uuid],
    kind: NotificationType,
    message: &str,
) -> AppResult<()> {
    if user_ids.is_empty() {
        return Ok(());
    }
    let rows = user_ids.iter().map(|user_id| ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(*user_id),
        message: Set(message.to_string()),
        kind: Set(kind.as_str().to_string()),
        read: Set(false),
        created_at: NotSet,
    });
    Notifications::insert_many(rows).exec(db).await?;
    Ok(())
}

/// Best-effort notification: a failed insert is logged and never fails the caller.
pub async fn notify<C: ConnectionTrait>(
    db: &C,
    user_ids: &[Uuid],
    kind: NotificationType,
    message: &str,
) {
    if let Err(err) = create_notifications(db, user_ids, kind, message).await {
        tracing::warn!(error = %err, kind = %kind, "notification failed");
    }
}
