use async_trait::async_trait;

use crate::domain::{
    error::DomainError,
    models::{email::EmailAddress, participant::Participant},
};

/// Signup and unregister, each checked and applied inside a single transaction.
#[async_trait]
pub trait EnrollmentRepository {
    async fn signup(
        &self,
        activity_name: &str,
        email: &EmailAddress,
    ) -> Result<Participant, DomainError>;

    async fn unregister(&self, activity_name: &str, email: &EmailAddress)
    -> Result<(), DomainError>;
}
