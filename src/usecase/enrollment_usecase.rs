use crate::domain::{
    error::DomainError,
    models::{email::EmailAddress, participant::Participant},
    repositories::enrollment_repository::EnrollmentRepository,
};

pub struct EnrollmentUsecase<E: EnrollmentRepository> {
    enrollment_repository: E,
}

impl<E: EnrollmentRepository> EnrollmentUsecase<E> {
    pub fn new(enrollment_repository: E) -> Self {
        Self {
            enrollment_repository,
        }
    }

    pub async fn signup(&self, activity_name: &str, email: &str) -> Result<Participant, DomainError>
    where
        E: Send + Sync,
    {
        let email = EmailAddress::parse(email)?;
        let participant = self.enrollment_repository.signup(activity_name, &email).await?;
        tracing::debug!(
            participant = participant.id(),
            activity_id = participant.activity_id(),
            "enrollment stored"
        );
        Ok(participant)
    }

    pub async fn unregister(&self, activity_name: &str, email: &str) -> Result<EmailAddress, DomainError>
    where
        E: Send + Sync,
    {
        let email = EmailAddress::parse(email)?;
        self.enrollment_repository
            .unregister(activity_name, &email)
            .await?;
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct RejectingRepository;

    #[async_trait]
    impl EnrollmentRepository for RejectingRepository {
        async fn signup(&self, _name: &str, _email: &EmailAddress) -> Result<Participant, DomainError> {
            panic!("malformed input must not reach the store")
        }

        async fn unregister(&self, _name: &str, _email: &EmailAddress) -> Result<(), DomainError> {
            panic!("malformed input must not reach the store")
        }
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_up_front() {
        let usecase = EnrollmentUsecase::new(RejectingRepository);

        assert!(matches!(
            usecase.signup("Chess Club", "not an email").await,
            Err(DomainError::InvalidEmail)
        ));
        assert!(matches!(
            usecase.unregister("Chess Club", "").await,
            Err(DomainError::InvalidEmail)
        ));
    }
}
