pub mod activity_repository;
pub mod credential_repository;
pub mod enrollment_repository;
pub mod user_repository;
