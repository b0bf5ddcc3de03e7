use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::{
    error::RepositoryError,
    models::{
        credential::{Credential, HashedPassword},
        email::EmailAddress,
        user::{NewUser, Role, User},
    },
    repositories::{credential_repository::CredentialRepository, user_repository::UserRepository},
};
use crate::infrastructure::db_err;
use entity::users::{self, UserRole};

#[derive(Clone)]
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(
        &self,
        column: users::Column,
        value: &str,
    ) -> Result<Option<users::Model>, RepositoryError> {
        users::Entity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await
            .map_err(db_err)
    }
}

fn role_from_entity(role: UserRole) -> Role {
    match role {
        UserRole::Student => Role::Student,
        UserRole::ActivityAdmin => Role::ActivityAdmin,
        UserRole::Admin => Role::Admin,
    }
}

fn role_to_entity(role: Role) -> UserRole {
    match role {
        Role::Student => UserRole::Student,
        Role::ActivityAdmin => UserRole::ActivityAdmin,
        Role::Admin => UserRole::Admin,
    }
}

fn to_domain(model: users::Model) -> Result<(User, HashedPassword), RepositoryError> {
    let corrupt = |e: crate::domain::error::DomainError| {
        RepositoryError::DatabaseError(format!("user {}: {e}", model.id))
    };
    let email = EmailAddress::parse(&model.email).map_err(corrupt)?;
    let user = User::new(
        model.id,
        model.username.clone(),
        email,
        role_from_entity(model.role),
        model.created_at,
    )
    .map_err(corrupt)?;

    Ok((user, HashedPassword::new(model.hashed_password)))
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.find_model(users::Column::Username, username)
            .await?
            .map(|model| to_domain(model).map(|(user, _)| user))
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError> {
        self.find_model(users::Column::Email, email.as_str())
            .await?
            .map(|model| to_domain(model).map(|(user, _)| user))
            .transpose()
    }

    async fn register_user(
        &self,
        user: NewUser,
        password_hash: HashedPassword,
    ) -> Result<User, RepositoryError> {
        let model = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email.as_str().to_string()),
            hashed_password: Set(password_hash.as_str().to_string()),
            role: Set(role_to_entity(user.role)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        to_domain(model).map(|(user, _)| user)
    }
}

#[async_trait]
impl CredentialRepository for SeaOrmUserRepository {
    async fn get_credential(&self, username: &str) -> Result<Credential, RepositoryError> {
        let model = self
            .find_model(users::Column::Username, username)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let (user, password_hash) = to_domain(model)?;
        Ok(Credential::new(user, password_hash))
    }
}
