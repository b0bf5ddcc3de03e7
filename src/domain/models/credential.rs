use std::fmt;

use crate::domain::{error::DomainError, models::user::User};

/// Value object representing a hashed password
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Create a new HashedPassword from an already hashed string
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Get the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

/// A stored account together with the hash its password must match.
#[derive(Debug, Clone)]
pub struct Credential {
    user: User,
    password_hash: HashedPassword,
}

impl Credential {
    pub fn new(user: User, password_hash: HashedPassword) -> Self {
        Self {
            user,
            password_hash,
        }
    }

    pub fn validate(&self, is_valid: bool) -> Result<(), DomainError> {
        if is_valid {
            Ok(())
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }

    pub fn into_user(self) -> User {
        self.user
    }

    pub fn password_hash(&self) -> &HashedPassword {
        &self.password_hash
    }
}
