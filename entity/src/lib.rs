//! sea-orm entities for the school activities store.

pub mod activities;
pub mod participants;
pub mod users;

