use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "blind_dates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub receiver_id: Uuid,
    /// Length of the session in minutes.
    pub duration: i32,
    pub active: bool,
    pub initiator_agree_to_reveal: bool,
    pub receiver_agree_to_reveal: bool,
    pub both_agree_to_reveal: bool,
    pub revealed: bool,
    pub expires_at: DateTimeWithTimeZone,
    pub ended_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// A session is over from the instant its window ends.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at.with_timezone(&Utc)
    }

    /// Whole seconds left before expiry, never negative.
    pub fn seconds_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at.with_timezone(&Utc) - now).num_seconds().max(0)
    }

    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.initiator_id == user_id {
            self.receiver_id
        } else {
            self.initiator_id
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::blind_date_messages::Entity")]
    Messages,
}

impl Related<super::blind_date_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(created: DateTime<Utc>, minutes: i64) -> Model {
        Model {
            id: Uuid::new_v4(),
            initiator_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            duration: minutes as i32,
            active: true,
            initiator_agree_to_reveal: false,
            receiver_agree_to_reveal: false,
            both_agree_to_reveal: false,
            revealed: false,
            expires_at: (created + Duration::minutes(minutes)).into(),
            ended_at: None,
            created_at: created.into(),
        }
    }

    #[test]
    fn expires_exactly_when_the_window_ends() {
        let start = Utc::now();
        let date = session(start, 15);
        assert!(!date.is_expired_at(start + Duration::minutes(15) - Duration::seconds(1)));
        assert!(date.is_expired_at(start + Duration::minutes(15)));
        assert_eq!(date.seconds_remaining_at(start + Duration::minutes(15)), 0);
    }

    #[test]
    fn remaining_time_counts_down_to_zero() {
        let start = Utc::now();
        let date = session(start, 15);
        assert_eq!(date.seconds_remaining_at(start + Duration::minutes(5)), 600);
        assert_eq!(date.seconds_remaining_at(start + Duration::minutes(20)), 0);
    }

    #[test]
    fn partner_is_the_other_participant() {
        let date = session(Utc::now(), 15);
        assert_eq!(date.partner_of(date.initiator_id), date.receiver_id);
        assert_eq!(date.partner_of(date.receiver_id), date.initiator_id);
    }
}
