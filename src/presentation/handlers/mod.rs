pub mod activity_handler;
pub mod auth_handler;
