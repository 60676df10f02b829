//! HS256 bearer-token issue/verify.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use stockroom_core::UserId;

use crate::claims::AccessClaims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token invalid")]
    Invalid,
}

/// Signs and verifies bearer tokens with a shared server secret.
///
/// The verification side only proves "this token was signed by us and has not
/// expired"; callers must still load the user row to confirm the subject
/// still exists.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a signed token for `user_id` with the fixed 10-hour expiry.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let claims = AccessClaims::issue(user_id, Utc::now());
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify signature and expiry, returning the subject user id.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        Ok(data.claims.sub)
    }
}
