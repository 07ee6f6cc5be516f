pub mod price_updater;
pub mod user_service;
