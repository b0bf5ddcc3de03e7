use crate::domain::{
    error::DomainError,
    models::activity::{Activity, ActivityPatch, NewActivity},
    repositories::activity_repository::ActivityRepository,
    services::{authorization::Operation, token_service::AuthIdentity},
};

/// Catalogue reads for everyone, writes for activity managers.
pub struct ActivityUsecase<A: ActivityRepository> {
    activity_repository: A,
}

impl<A: ActivityRepository> ActivityUsecase<A> {
    pub fn new(activity_repository: A) -> Self {
        Self {
            activity_repository,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Activity>, DomainError>
    where
        A: Send + Sync,
    {
        self.activity_repository.list_all().await
    }

    /// The role gate runs before the input is validated, so a caller without the
    /// role hears `Forbidden` whatever they sent.
    pub async fn create(
        &self,
        caller: &AuthIdentity,
        name: String,
        description: String,
        schedule: String,
        max_participants: i32,
    ) -> Result<Activity, DomainError>
    where
        A: Send + Sync,
    {
        authorize(caller, Operation::CreateActivity)?;
        let activity = NewActivity::new(name, description, schedule, max_participants)?;
        self.activity_repository.create(activity).await
    }

    pub async fn update(
        &self,
        caller: &AuthIdentity,
        name: &str,
        description: Option<String>,
        schedule: Option<String>,
        max_participants: Option<i32>,
    ) -> Result<Activity, DomainError>
    where
        A: Send + Sync,
    {
        authorize(caller, Operation::UpdateActivity)?;
        let patch = ActivityPatch::new(description, schedule, max_participants)?;
        self.activity_repository.update(name, patch).await
    }

    pub async fn delete(&self, caller: &AuthIdentity, name: &str) -> Result<(), DomainError>
    where
        A: Send + Sync,
    {
        authorize(caller, Operation::DeleteActivity)?;
        self.activity_repository.delete(name).await
    }
}

fn authorize(caller: &AuthIdentity, operation: Operation) -> Result<(), DomainError> {
    operation.gate().check(caller.role).inspect_err(|_| {
        tracing::warn!(
            username = %caller.username,
            role = %caller.role,
            ?operation,
            "operation forbidden for role"
        );
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::domain::models::{activity::MaxParticipants, user::Role};

    /// Counts how often the store is reached.
    #[derive(Clone, Default)]
    struct CountingRepository {
        calls: Arc<AtomicUsize>,
    }

    fn sample(name: &str) -> Activity {
        Activity::reconstruct(
            name.to_string(),
            "desc".into(),
            "sched".into(),
            MaxParticipants::new(10).unwrap(),
            Vec::new(),
        )
    }

    #[async_trait]
    impl ActivityRepository for CountingRepository {
        async fn list_all(&self) -> Result<Vec<Activity>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![sample("Chess Club")])
        }

        async fn create(&self, activity: NewActivity) -> Result<Activity, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample(&activity.name))
        }

        async fn update(&self, name: &str, _patch: ActivityPatch) -> Result<Activity, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample(name))
        }

        async fn delete(&self, _name: &str) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn student_is_forbidden_and_store_untouched() {
        let repo = CountingRepository::default();
        let usecase = ActivityUsecase::new(repo.clone());
        let student = AuthIdentity::new("noah", Role::Student);

        let created = usecase
            .create(&student, "Robotics".into(), "Build robots".into(), "Mondays".into(), 8)
            .await;
        let updated = usecase.update(&student, "Robotics", None, Some("Never".into()), None).await;
        let deleted = usecase.delete(&student, "Robotics").await;

        assert!(matches!(created, Err(DomainError::Forbidden)));
        assert!(matches!(updated, Err(DomainError::Forbidden)));
        assert!(matches!(deleted, Err(DomainError::Forbidden)));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn managers_reach_the_store() {
        for role in [Role::Admin, Role::ActivityAdmin] {
            let repo = CountingRepository::default();
            let usecase = ActivityUsecase::new(repo.clone());
            let manager = AuthIdentity::new("principal", role);

            usecase
                .create(&manager, "Robotics".into(), "Build robots".into(), "Mondays".into(), 8)
                .await
                .unwrap();
            usecase.update(&manager, "Robotics", None, None, Some(10)).await.unwrap();
            usecase.delete(&manager, "Robotics").await.unwrap();
            assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
        }
    }

    #[tokio::test]
    async fn role_is_checked_before_input() {
        let repo = CountingRepository::default();
        let usecase = ActivityUsecase::new(repo.clone());
        let student = AuthIdentity::new("noah", Role::Student);

        let created = usecase.create(&student, " ".into(), "d".into(), "s".into(), 0).await;
        let updated = usecase.update(&student, "Chess Club", None, None, Some(-1)).await;
        assert!(matches!(created, Err(DomainError::Forbidden)));
        assert!(matches!(updated, Err(DomainError::Forbidden)));

        let manager = AuthIdentity::new("principal", Role::Admin);
        let invalid = usecase.create(&manager, "Robotics".into(), "d".into(), "s".into(), 0).await;
        assert!(matches!(invalid, Err(DomainError::InvalidMaxParticipants)));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn listing_needs_no_identity() {
        let usecase = ActivityUsecase::new(CountingRepository::default());
        assert_eq!(usecase.list_all().await.unwrap().len(), 1);
    }
}
