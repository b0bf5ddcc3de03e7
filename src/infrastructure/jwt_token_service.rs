use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    error::DomainError,
    models::user::Role,
    services::token_service::{AuthIdentity, Token, TokenService},
};

/// Lifetime used when a caller asks for a token without naming one.
pub const FALLBACK_TTL_MINUTES: i64 = 15;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // Subject (username)
    role: Role,
    exp: i64, // Expiration time
    iat: i64, // Issued at
    jti: String,
}

/// HS256 tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    fallback_ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            fallback_ttl: Duration::minutes(FALLBACK_TTL_MINUTES),
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                DomainError::InvalidToken
            })?
            .claims;

        // The library only rejects `exp < now`; a token must expire strictly in the future.
        if claims.exp <= Utc::now().timestamp() {
            return Err(DomainError::InvalidToken);
        }

        Ok(claims)
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, identity: &AuthIdentity, ttl: Option<Duration>) -> Result<Token, DomainError> {
        let now = Utc::now();
        let exp = now + ttl.unwrap_or(self.fallback_ttl);

        let claims = Claims {
            sub: identity.username.clone(),
            role: identity.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::TokenIssue(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthIdentity, DomainError> {
        let claims = self.decode_claims(token)?;
        if claims.sub.is_empty() {
            return Err(DomainError::InvalidToken);
        }
        Ok(AuthIdentity::new(claims.sub, claims.role))
    }
}
