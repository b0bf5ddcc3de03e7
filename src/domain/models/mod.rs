pub mod activity;
pub mod credential;
pub mod email;
pub mod participant;
pub mod user;
