use crate::domain::{error::DomainError, models::credential::HashedPassword};

/// One-way password hashing for stored accounts.
pub trait PasswordHasher: Clone {
    /// Salted hash of `plain_password`; two calls with the same input differ.
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError>;

    /// `Ok(false)` on a mismatch. A hash that cannot be parsed is an error.
    fn verify(&self, plain_password: &str, stored: &HashedPassword) -> Result<bool, DomainError>;
}
