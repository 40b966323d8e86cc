use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blind_date_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub blind_date_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub kind: String,
    pub anonymous: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blind_dates::Entity",
        from = "Column::BlindDateId",
        to = "super::blind_dates::Column::Id"
    )]
    BlindDates,
}

impl Related<super::blind_dates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlindDates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
