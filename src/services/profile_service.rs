use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::profile::{EngagementStats, MoodResponse, ReceivedLike, UpdateProfileRequest},
    entity::{
        Chats, Comments, Likes, Matches, Photos,
        chats::Column as ChatCol,
        comments::Column as CommentCol,
        likes::Column as LikeCol,
        matches::Column as MatchCol,
        photos::{ActiveModel as PhotoActive, Column as PhotoCol},
        users::ActiveModel as UserActive,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Account, Comment, Photo, PublicProfile, UserSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::lookup::{cover_photos, find_user, photos_of, users_by_id},
    state::AppState,
};

pub const MIN_UPLOAD_IMAGES: usize = 3;
pub const MAX_UPLOAD_IMAGES: usize = 6;
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

const UPLOAD_URL_PREFIX: &str = "/uploads/";

/// One image file received from a multipart upload.
#[derive(Debug)]
pub struct UploadedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// File extension for an accepted content type.
    pub fn extension(&self) -> Option<&'static str> {
        match self.content_type.as_str() {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            _ => None,
        }
    }
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Account>> {
    let account = find_user(&state.orm, user.user_id).await?;
    let photos = photos_of(&state.orm, account.id).await?;
    Ok(ApiResponse::success(
        "OK",
        Account::new(account, photos),
        Some(Meta::empty()),
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Account>> {
    payload.validate()?;
    let existing = find_user(&state.orm, user.user_id).await?;

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        active.name = Set(name);
    }
    if let Some(age) = payload.age {
        active.age = Set(Some(age));
    }
    if let Some(gender) = payload.gender {
        active.gender = Set(Some(gender));
    }
    if let Some(branch) = payload.branch {
        active.branch = Set(Some(branch));
    }
    if let Some(visible) = payload.branch_visible {
        active.branch_visible = Set(visible);
    }
    if let Some(height) = payload.height {
        active.height = Set(Some(height));
    }
    if let Some(about) = payload.about {
        active.about = Set(Some(about));
    }
    if let Some(personality) = payload.personality_type {
        active.personality_type = Set(Some(personality.as_str().to_string()));
    }
    if let Some(interests) = payload.interests {
        active.interests = Set(interests);
    }
    if let Some(tags) = payload.campus_vibe_tags {
        active.campus_vibe_tags = Set(tags);
    }
    if let Some(artists) = payload.favorite_artist {
        active.favorite_artist = Set(artists);
    }
    if let Some(spot) = payload.hangout_spot {
        active.hangout_spot = Set(Some(spot));
    }
    if let Some(prompt) = payload.fun_prompt_1 {
        active.fun_prompt_1 = Set(Some(prompt));
    }
    if let Some(prompt) = payload.fun_prompt_2 {
        active.fun_prompt_2 = Set(Some(prompt));
    }
    if let Some(prompt) = payload.fun_prompt_3 {
        active.fun_prompt_3 = Set(Some(prompt));
    }
    if let Some(mood) = payload.current_mood {
        active.current_mood = Set(Some(mood));
    }
    if let Some(intent) = payload.connection_intent {
        active.connection_intent = Set(Some(intent.as_str().to_string()));
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;
    let photos = photos_of(&state.orm, updated.id).await?;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        Account::new(updated, photos),
        Some(Meta::empty()),
    ))
}

/// Validates and stores 3 to 6 images, appending them after existing photos.
pub async fn upload_images(
    state: &AppState,
    user: &AuthUser,
    files: Vec<UploadedImage>,
) -> AppResult<ApiResponse<Vec<Photo>>> {
    if files.len() < MIN_UPLOAD_IMAGES || files.len() > MAX_UPLOAD_IMAGES {
        return Err(AppError::bad_request("Please upload between 3 to 6 images."));
    }
    for file in &files {
        if file.extension().is_none() {
            return Err(AppError::bad_request(
                "Invalid file type. Only JPEG, PNG, and GIF are allowed.",
            ));
        }
        if file.bytes.is_empty() || file.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::bad_request("Image is empty or too large"));
        }
    }

    let dir = PathBuf::from(&state.config.upload_dir).join("profiles");
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::internal(format!("create upload dir: {e}")))?;

    let txn = state.orm.begin().await?;
    let existing = Photos::find()
        .filter(PhotoCol::UserId.eq(user.user_id))
        .count(&txn)
        .await? as i32;

    let mut written = Vec::with_capacity(files.len());
    let stored = match store_images(&txn, &dir, user.user_id, existing, &files, &mut written).await {
        Ok(saved) => txn.commit().await.map(|_| saved).map_err(AppError::from),
        Err(err) => Err(err),
    };
    let saved = match stored {
        Ok(saved) => saved,
        Err(err) => {
            remove_files(&written).await;
            return Err(err);
        }
    };

    tracing::info!(user_id = %user.user_id, count = saved.len(), "profile images uploaded");
    Ok(ApiResponse::success(
        "Images uploaded successfully.",
        saved,
        Some(Meta::empty()),
    ))
}

/// Writes each image and inserts its row. Paths land in `written` as soon as
/// the file exists so the caller can remove them if the upload fails.
async fn store_images<C: ConnectionTrait>(
    db: &C,
    dir: &Path,
    user_id: Uuid,
    first_position: i32,
    files: &[UploadedImage],
    written: &mut Vec<PathBuf>,
) -> AppResult<Vec<Photo>> {
    let mut saved = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let ext = file.extension().unwrap_or("jpg");
        let filename = format!("profile-{}.{ext}", Uuid::new_v4());
        let path = dir.join(&filename);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::internal(format!("write upload: {e}")))?;
        written.push(path);

        let photo = PhotoActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            url: Set(format!("{UPLOAD_URL_PREFIX}profiles/{filename}")),
            position: Set(first_position + index as i32),
            created_at: NotSet,
        }
        .insert(db)
        .await?;
        saved.push(Photo::from(photo));
    }
    Ok(saved)
}

async fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove upload");
            }
        }
    }
}

/// Disk location of a photo served from `/uploads`. Foreign URLs and
/// anything trying to climb out of the upload dir map to `None`.
pub fn upload_path(upload_dir: &str, url: &str) -> Option<PathBuf> {
    let relative = Path::new(url.strip_prefix(UPLOAD_URL_PREFIX)?);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(Path::new(upload_dir).join(relative))
}

/// Best-effort removal of stored photo files; failures are only logged.
pub async fn remove_uploads(upload_dir: &str, urls: &[String]) {
    let paths: Vec<PathBuf> = urls
        .iter()
        .filter_map(|url| upload_path(upload_dir, url))
        .collect();
    remove_files(&paths).await;
}

pub async fn engagement_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<EngagementStats>> {
    let likes_received = Likes::find()
        .filter(LikeCol::LikedId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    let matches_count = Matches::find()
        .filter(
            Condition::any()
                .add(MatchCol::User1Id.eq(user.user_id))
                .add(MatchCol::User2Id.eq(user.user_id)),
        )
        .filter(MatchCol::IsActive.eq(true))
        .count(&state.orm)
        .await?;
    let messages_received = Chats::find()
        .filter(ChatCol::ReceiverId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    let comments_received = Comments::find()
        .filter(CommentCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "OK",
        EngagementStats {
            likes_received,
            matches_count,
            messages_received,
            comments_received,
        },
        Some(Meta::empty()),
    ))
}

pub async fn received_likes(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<ReceivedLike>>> {
    let (page, limit, offset) = pagination.normalize();
    let likes = Likes::find()
        .filter(LikeCol::LikedId.eq(user.user_id))
        .order_by_desc(LikeCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let liker_ids: Vec<Uuid> = likes.iter().map(|l| l.liker_id).collect();
    let users = users_by_id(&state.orm, &liker_ids).await?;
    let mut covers = cover_photos(&state.orm, &liker_ids).await?;

    let returned = likes.len();
    let items = likes
        .into_iter()
        .filter_map(|like| {
            let liker = users.get(&like.liker_id)?;
            Some(ReceivedLike {
                id: like.id,
                user: UserSummary::new(liker, covers.remove(&like.liker_id)),
                liked_at: like.created_at.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        items,
        Some(Meta::page_only(page, limit, returned)),
    ))
}

pub async fn received_comments(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Comment>>> {
    let (page, limit, offset) = pagination.normalize();
    let comments: Vec<Comment> = Comments::find()
        .filter(CommentCol::UserId.eq(user.user_id))
        .order_by_desc(CommentCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Comment::from)
        .collect();

    let meta = Meta::page_only(page, limit, comments.len());
    Ok(ApiResponse::success("OK", comments, Some(meta)))
}

pub async fn current_mood(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<MoodResponse>> {
    let account = find_user(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success(
        "OK",
        MoodResponse {
            current_mood: account.current_mood,
        },
        Some(Meta::empty()),
    ))
}

/// Another student's profile with only its cover photo.
pub async fn public_profile(state: &AppState, id: Uuid) -> AppResult<ApiResponse<PublicProfile>> {
    let user = find_user(&state.orm, id).await?;
    let cover = photos_of(&state.orm, id).await?.into_iter().take(1).collect();
    Ok(ApiResponse::success(
        "OK",
        PublicProfile::new(user, cover),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supported_image_types_have_extensions() {
        let image = |ct: &str| UploadedImage {
            content_type: ct.to_string(),
            bytes: vec![1],
        };
        assert_eq!(image("image/jpeg").extension(), Some("jpg"));
        assert_eq!(image("image/gif").extension(), Some("gif"));
        assert_eq!(image("image/webp").extension(), None);
        assert_eq!(image("application/pdf").extension(), None);
    }

    #[test]
    fn photo_urls_map_inside_the_upload_dir() {
        assert_eq!(
            upload_path("/srv/uploads", "/uploads/profiles/profile-1.jpg"),
            Some(PathBuf::from("/srv/uploads/profiles/profile-1.jpg"))
        );
        assert_eq!(upload_path("/srv/uploads", "/uploads/../etc/passwd"), None);
        assert_eq!(upload_path("/srv/uploads", "/uploads//etc/passwd"), None);
        assert_eq!(upload_path("/srv/uploads", "https://cdn.example.com/a.jpg"), None);
    }

    #[tokio::test]
    async fn removing_uploads_deletes_files_and_ignores_missing_ones() {
        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(dir.join("profiles")).await.unwrap();
        let file = dir.join("profiles").join("profile-a.png");
        tokio::fs::write(&file, b"png").await.unwrap();

        let root = dir.to_str().unwrap();
        remove_uploads(
            root,
            &[
                "/uploads/profiles/profile-a.png".to_string(),
                "/uploads/profiles/profile-gone.png".to_string(),
            ],
        )
        .await;

        assert!(!file.exists());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
