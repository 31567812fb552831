use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::user::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token lifetime does not fit the clock")]
    TtlOverflow,

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(TokenError::TtlOverflow)?;
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now,
            exp,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Doctor,
            password_hash: String::new(),
            doctor: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = TokenIssuer::new("secret", Duration::from_secs(3600));
        let user = user();
        let claims = issuer.verify(&issuer.issue(&user).unwrap()).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenIssuer::new("one", Duration::from_secs(60))
            .issue(&user())
            .unwrap();
        assert!(TokenIssuer::new("two", Duration::from_secs(60))
            .verify(&token)
            .is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        for secs in [u64::MAX, i64::MAX as u64] {
            let issuer = TokenIssuer::new("secret", Duration::from_secs(secs));
            assert!(matches!(issuer.issue(&user()), Err(TokenError::TtlOverflow)));
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        // Default validation allows 60s of leeway.
        let issuer = TokenIssuer::new("secret", Duration::from_secs(0));
        let mut claims = issuer.verify(&issuer.issue(&user()).unwrap()).unwrap();
        claims.exp -= 3600;
        let stale = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(issuer.verify(&stale).is_err());
    }
}
