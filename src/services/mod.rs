pub mod auth_service;
pub mod blind_date_service;
pub mod lookup;
pub mod match_service;
pub mod messaging_service;
pub mod profile_service;
pub mod settings_service;
