pub mod activity_repository;
pub mod argon2_password_hasher;
pub mod enrollment_repository;
pub mod jwt_token_service;
pub mod schema;
pub mod seed;
pub mod user_repository;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, IsolationLevel,
    SqlErr, TransactionTrait,
};

use crate::domain::error::{DomainError, RepositoryError};

pub(crate) fn db_err(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::UniqueViolation(detail),
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}

/// Like [`db_err`], but a unique-index violation becomes a `Conflict` carrying `message`.
pub(crate) fn conflict_or_db_err(err: DbErr, message: &str) -> DomainError {
    match db_err(err) {
        RepositoryError::UniqueViolation(_) => DomainError::Conflict(message.to_string()),
        other => other.into(),
    }
}

/// Begin a transaction whose reads and writes are decided together at commit.
///
/// SQLite already serializes writers, so only server databases get an explicit level.
pub(crate) async fn begin_serializable(
    db: &DatabaseConnection,
) -> Result<DatabaseTransaction, RepositoryError> {
    let isolation = match db.get_database_backend() {
        DbBackend::Postgres | DbBackend::MySql => Some(IsolationLevel::Serializable),
        _ => None,
    };
    db.begin_with_config(isolation, None).await.map_err(db_err)
}
