//! Session token codec. The payload carries only the user id and an
//! expiry; everything else about the user is re-read from the store on
//! each request, so role changes take effect without reissuing tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_user(user_id: i64, ttl: Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    /// `None` when `sub` is not a user id.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: &SessionClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    jsonwebtoken::encode(&header, claims, &key)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<SessionClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_carries_the_user_id() {
        let claims = SessionClaims::for_user(17, Duration::hours(1));
        let token = generate_token(&claims, "secret").unwrap();
        let decoded = process_token(&token, "secret").unwrap();
        assert_eq!(decoded.claims.user_id(), Some(17));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = SessionClaims {
            sub: "17".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = generate_token(&claims, "secret").unwrap();
        assert!(process_token(&token, "secret").is_err());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let claims = SessionClaims::for_user(17, Duration::hours(1));
        let token = generate_token(&claims, "secret").unwrap();
        assert!(process_token(&token, "other-secret").is_err());
    }
}
