use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub college: String,
    pub verified: bool,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTimeWithTimeZone>,
    pub reset_password_token: Option<String>,
    pub reset_password_expires_at: Option<DateTimeWithTimeZone>,
    pub last_login: Option<DateTimeWithTimeZone>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub branch: Option<String>,
    pub branch_visible: bool,
    pub height: Option<f64>,
    pub about: Option<String>,
    pub personality_type: Option<String>,
    pub interests: Vec<String>,
    pub campus_vibe_tags: Vec<String>,
    pub favorite_artist: Vec<String>,
    pub hangout_spot: Option<String>,
    pub fun_prompt_1: Option<String>,
    pub fun_prompt_2: Option<String>,
    pub fun_prompt_3: Option<String>,
    pub current_mood: Option<String>,
    pub connection_intent: Option<String>,
    pub allow_comments: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::photos::Entity")]
    Photos,
    #[sea_orm(has_one = "super::settings::Entity")]
    Settings,
    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,
}

impl Related<super::photos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl Related<super::settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settings.def()
    }
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
