use async_trait::async_trait;

use crate::domain::{error::RepositoryError, models::credential::Credential};

#[async_trait]
pub trait CredentialRepository {
    /// Fails with `RepositoryError::NotFound` for an unknown username.
    async fn get_credential(&self, username: &str) -> Result<Credential, RepositoryError>;
}
