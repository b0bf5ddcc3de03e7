use serde::{Deserialize, Serialize};

use crate::domain::models::email::EmailAddress;

/// A student's enrollment record in one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: i32,
    activity_id: i32,
    email: EmailAddress,
}

impl Participant {
    pub fn new(id: i32, activity_id: i32, email: EmailAddress) -> Self {
        Self {
            id,
            activity_id,
            email,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }
    pub fn activity_id(&self) -> i32 {
        self.activity_id
    }
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}
