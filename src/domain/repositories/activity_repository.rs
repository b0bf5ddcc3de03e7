use async_trait::async_trait;

use crate::domain::{
    error::DomainError,
    models::activity::{Activity, ActivityPatch, NewActivity},
};

/// Activity registry. Every mutating call is one store transaction.
#[async_trait]
pub trait ActivityRepository {
    /// Every activity with its participant emails, in store order.
    async fn list_all(&self) -> Result<Vec<Activity>, DomainError>;

    /// Fails with `Conflict` when the name is taken.
    async fn create(&self, activity: NewActivity) -> Result<Activity, DomainError>;

    /// Fails with `NotFound` when no activity has this name.
    async fn update(&self, name: &str, patch: ActivityPatch) -> Result<Activity, DomainError>;

    /// Removes the activity and all of its participants.
    async fn delete(&self, name: &str) -> Result<(), DomainError>;
}
