pub mod blind_date_messages;
pub mod blind_dates;
pub mod blocks;
pub mod chats;
pub mod comments;
pub mod likes;
pub mod matches;
pub mod notifications;
pub mod passes;
pub mod photos;
pub mod settings;
pub mod users;

pub use blind_date_messages::Entity as BlindDateMessages;
pub use blind_dates::Entity as BlindDates;
pub use blocks::Entity as Blocks;
pub use chats::Entity as Chats;
pub use comments::Entity as Comments;
pub use likes::Entity as Likes;
pub use matches::Entity as Matches;
pub use notifications::Entity as Notifications;
pub use passes::Entity as Passes;
pub use photos::Entity as Photos;
pub use settings::Entity as Settings;
pub use users::Entity as Users;
