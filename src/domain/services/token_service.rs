use chrono::Duration;

use crate::domain::{error::DomainError, models::user::Role};

pub type Token = String;

/// Who a verified token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub username: String,
    pub role: Role,
}

impl AuthIdentity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

pub trait TokenService: Send + Sync {
    /// Issue a signed token for `identity`. `None` uses the service's fallback lifetime.
    fn issue(&self, identity: &AuthIdentity, ttl: Option<Duration>) -> Result<Token, DomainError>;

    /// Check signature and expiry, returning the identity the token carries.
    fn verify(&self, token: &str) -> Result<AuthIdentity, DomainError>;
}
