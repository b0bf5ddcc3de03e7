use chrono::Duration;

use crate::domain::{
    error::{DomainError, RepositoryError},
    models::user::User,
    repositories::{credential_repository::CredentialRepository, user_repository::UserRepository},
    services::{
        password_service::PasswordHasher,
        token_service::{AuthIdentity, Token, TokenService},
    },
};

pub struct LoginUsecase<C: CredentialRepository, U: UserRepository, P: PasswordHasher, T: TokenService> {
    credential_repository: C,
    user_repository: U,
    password_hasher: P,
    token_service: T,
    access_token_ttl: Duration,
}

impl<C: CredentialRepository, U: UserRepository, P: PasswordHasher, T: TokenService> LoginUsecase<C, U, P, T> {
    pub fn new(
        credential_repository: C,
        user_repository: U,
        password_hasher: P,
        token_service: T,
        access_token_ttl: Duration,
    ) -> Self {
        Self {
            credential_repository,
            user_repository,
            password_hasher,
            token_service,
            access_token_ttl,
        }
    }

    /// Exchange a username and password for an access token.
    ///
    /// An unknown username and a wrong password fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, DomainError>
    where
        C: Send + Sync,
        U: Send + Sync,
        P: Send + Sync,
    {
        let credential = match self.credential_repository.get_credential(username).await {
            Ok(credential) => credential,
            Err(RepositoryError::NotFound) => {
                tracing::info!(%username, "login for unknown user");
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let is_valid = self
            .password_hasher
            .verify(password, credential.password_hash())?;
        if let Err(e) = credential.validate(is_valid) {
            tracing::info!(%username, "login with wrong password");
            return Err(e);
        }

        let user = credential.into_user();
        let token = self.issue_for(&user)?;

        tracing::info!(%username, role = %user.role(), "user logged in");
        Ok(token)
    }

    /// The account a verified token speaks for. A deleted account invalidates its tokens.
    pub async fn current_user(&self, identity: &AuthIdentity) -> Result<User, DomainError>
    where
        U: Send + Sync,
    {
        self.user_repository
            .find_by_username(&identity.username)
            .await?
            .ok_or(DomainError::InvalidToken)
    }

    /// Issue a fresh token for the holder of a still-valid one, with the role as stored now.
    pub async fn refresh(&self, identity: &AuthIdentity) -> Result<Token, DomainError>
    where
        U: Send + Sync,
    {
        let user = self.current_user(identity).await?;
        self.issue_for(&user)
    }

    fn issue_for(&self, user: &User) -> Result<Token, DomainError> {
        let identity = AuthIdentity::new(user.username(), user.role());
        self.token_service.issue(&identity, Some(self.access_token_ttl))
    }
}
