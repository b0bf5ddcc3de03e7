use crate::domain::{
    error::RepositoryError,
    models::{
        credential::HashedPassword,
        email::EmailAddress,
        user::{NewUser, User},
    },
};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError>;
    async fn register_user(
        &self,
        user: NewUser,
        password_hash: HashedPassword,
    ) -> Result<User, RepositoryError>;
}
