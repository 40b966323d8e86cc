//! Shared reads used by several services.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        Photos, Users,
        photos::Column as PhotoCol,
        users::{Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::Photo,
};

pub async fn find_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn find_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> AppResult<Option<UserModel>> {
    Ok(Users::find()
        .filter(UserCol::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

pub async fn users_by_id<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, UserModel>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = Users::find()
        .filter(UserCol::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

pub async fn photos_of<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Vec<Photo>> {
    let photos = Photos::find()
        .filter(PhotoCol::UserId.eq(user_id))
        .order_by_asc(PhotoCol::Position)
        .all(db)
        .await?;
    Ok(photos.into_iter().map(Photo::from).collect())
}

/// All photos of the given users, each list in display order.
pub async fn photos_by_user<C: ConnectionTrait>(
    db: &C,
    user_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Photo>>> {
    let mut grouped: HashMap<Uuid, Vec<Photo>> = HashMap::new();
    if user_ids.is_empty() {
        return Ok(grouped);
    }
    let photos = Photos::find()
        .filter(PhotoCol::UserId.is_in(user_ids.iter().copied()))
        .order_by_asc(PhotoCol::UserId)
        .order_by_asc(PhotoCol::Position)
        .all(db)
        .await?;
    for photo in photos {
        grouped.entry(photo.user_id).or_default().push(Photo::from(photo));
    }
    Ok(grouped)
}

/// First photo of each of the given users.
pub async fn cover_photos<C: ConnectionTrait>(
    db: &C,
    user_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Photo>> {
    let grouped = photos_by_user(db, user_ids).await?;
    Ok(grouped
        .into_iter()
        .filter_map(|(id, photos)| photos.into_iter().next().map(|p| (id, p)))
        .collect())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
