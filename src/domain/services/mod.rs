pub mod authorization;
pub mod enrollment_rules;
pub mod password_service;
pub mod token_service;
