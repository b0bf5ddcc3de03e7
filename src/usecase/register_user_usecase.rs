use crate::domain::{
    error::{DomainError, RepositoryError},
    models::{
        email::EmailAddress,
        user::{NewUser, Role, User},
    },
    repositories::user_repository::UserRepository,
    services::{
        authorization::Operation, password_service::PasswordHasher, token_service::AuthIdentity,
    },
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct RegisterUserUsecase<U: UserRepository, P: PasswordHasher> {
    user_repository: U,
    password_hasher: P,
}

impl<U: UserRepository, P: PasswordHasher> RegisterUserUsecase<U, P> {
    pub fn new(user_repository: U, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Self-service registration. Anyone may create a STUDENT account; any other
    /// role needs an authenticated ADMIN `caller`.
    pub async fn create_user(
        &self,
        username: String,
        email: &str,
        password: &str,
        role: Option<Role>,
        caller: Option<&AuthIdentity>,
    ) -> Result<User, DomainError>
    where
        U: Send + Sync,
        P: Send + Sync,
    {
        let role = role.unwrap_or_default();
        if role != Role::Student {
            let granted = caller
                .map(|c| Operation::GrantElevatedRole.gate().check(c.role))
                .unwrap_or(Err(DomainError::Forbidden));
            if let Err(e) = granted {
                tracing::warn!(
                    caller = caller.map(|c| c.username.as_str()),
                    %role,
                    "elevated role requested without ADMIN rights"
                );
                return Err(e);
            }
        }
        self.register(username, email, password, role).await
    }

    /// Create the configured ADMIN account unless the username is already taken.
    ///
    /// Returns whether an account was created.
    pub async fn bootstrap_admin(
        &self,
        username: String,
        email: &str,
        password: &str,
    ) -> Result<bool, DomainError>
    where
        U: Send + Sync,
        P: Send + Sync,
    {
        if self
            .user_repository
            .find_by_username(username.trim())
            .await?
            .is_some()
        {
            return Ok(false);
        }
        self.register(username, email, password, Role::Admin).await?;
        Ok(true)
    }

    async fn register(
        &self,
        username: String,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, DomainError>
    where
        U: Send + Sync,
        P: Send + Sync,
    {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::EmptyField("username"));
        }
        let email = EmailAddress::parse(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::WeakPassword);
        }

        if self.user_repository.find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username already registered".to_string()));
        }
        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".to_string()));
        }

        // Hash password
        let password_hash = self.password_hasher.hash(password)?;

        let new_user = NewUser {
            username,
            email,
            role,
        };
        let user = match self.user_repository.register_user(new_user, password_hash).await {
            Ok(user) => user,
            // lost a race with a concurrent registration
            Err(RepositoryError::UniqueViolation(_)) => {
                return Err(DomainError::Conflict(
                    "Username or email already registered".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(username = %user.username(), role = %user.role(), "user registered");
        Ok(user)
    }
}
