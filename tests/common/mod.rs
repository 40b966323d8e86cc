#![allow(dead_code)]

use campus_match_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    models::PersonalityType,
    services::auth_service::hash_password,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

static DB_LOCK: Mutex<()> = Mutex::const_new(());

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            None
        }
    }
}

/// Migrated, empty database. Hold the guard for the whole test: the tests in
/// one binary share the tables.
pub async fn setup_state(database_url: &str) -> anyhow::Result<(AppState, MutexGuard<'static, ()>)> {
    let guard = DB_LOCK.lock().await;
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    let state = AppState::new(pool, AppConfig::for_database(database_url));

    state
        .orm
        .execute(Statement::from_string(
            state.orm.get_database_backend(),
            "TRUNCATE blind_date_messages, blind_dates, chats, notifications, comments, likes, \
             passes, blocks, matches, photos, settings, users RESTART IDENTITY CASCADE"
                .to_string(),
        ))
        .await?;

    Ok((state, guard))
}

/// Same state with uploads stored under a fresh temp directory.
pub fn with_upload_dir(state: AppState) -> (AppState, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!("campus-uploads-{}", Uuid::new_v4()));
    let mut config = (*state.config).clone();
    config.upload_dir = dir.to_string_lossy().into_owned();
    (
        AppState {
            config: std::sync::Arc::new(config),
            ..state
        },
        dir,
    )
}

pub struct Student<'a> {
    pub name: &'a str,
    pub age: Option<i32>,
    pub personality: Option<PersonalityType>,
    pub interests: &'a [&'a str],
}

impl<'a> Student<'a> {
    pub fn named(name: &'a str) -> Self {
        Self {
            name,
            age: None,
            personality: None,
            interests: &[],
        }
    }
}

pub async fn create_student(state: &AppState, student: Student<'_>) -> anyhow::Result<AuthUser> {
    let now = chrono::Utc::now().fixed_offset();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{}@example.edu", student.name.to_lowercase())),
        password_hash: Set(hash_password("password123")?),
        name: Set(student.name.to_string()),
        college: Set("Test College".to_string()),
        verified: Set(true),
        otp_code: Set(None),
        otp_expires_at: Set(None),
        reset_password_token: Set(None),
        reset_password_expires_at: Set(None),
        last_login: Set(None),
        age: Set(student.age),
        gender: Set(None),
        branch: Set(None),
        branch_visible: Set(true),
        height: Set(None),
        about: Set(None),
        personality_type: Set(student.personality.map(|p| p.as_str().to_string())),
        interests: Set(student.interests.iter().map(|i| i.to_string()).collect()),
        campus_vibe_tags: Set(vec![]),
        favorite_artist: Set(vec![]),
        hangout_spot: Set(None),
        fun_prompt_1: Set(None),
        fun_prompt_2: Set(None),
        fun_prompt_3: Set(None),
        current_mood: Set(None),
        connection_intent: Set(None),
        allow_comments: Set(true),
        created_at: Set(now),
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser { user_id: user.id })
}
