pub mod activity_usecase;
pub mod enrollment_usecase;
pub mod login_usecase;
pub mod register_user_usecase;
