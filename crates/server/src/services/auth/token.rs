//! Stateless signed session tokens (HS256 JWT).
//!
//! A token binds a user id to an issue time and expiry. Nothing is stored
//! server-side; a token stays valid until it expires.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use taskie_core::UserId;

use super::TokenError;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: i32,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// Issues and verifies session tokens with a process-wide signing key.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Create a token service signing with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// Issue a token for `user_id`, valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue_at(&self, user_id: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.as_i32(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)
    }

    /// Verify a token's signature and expiry and return its user id.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` once the expiry has passed and
    /// `TokenError::Invalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        Ok(UserId::new(data.claims.sub))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    const TTL: Duration = Duration::from_secs(3600);

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret), TTL)
    }

    fn tamper(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%");
        let token = tokens.issue(UserId::new(42)).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%");
        let issued = Utc::now() - TimeDelta::seconds(3601);
        let token = tokens.issue_at(UserId::new(1), issued).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_near_expiry_still_valid() {
        let tokens = service("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%");
        let issued = Utc::now() - TimeDelta::seconds(3500);
        let token = tokens.issue_at(UserId::new(1), issued).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), UserId::new(1));
    }

    #[test]
    fn test_altered_token_rejected() {
        let tokens = service("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%");
        let token = tokens.issue(UserId::new(7)).unwrap();
        let dots: Vec<usize> = token.match_indices('.').map(|(i, _)| i).collect();

        // One position inside each of header, payload, and signature.
        for index in [dots[0] / 2, (dots[0] + dots[1]) / 2, (dots[1] + token.len()) / 2] {
            let altered = tamper(&token, index);
            assert_ne!(altered, token);
            assert!(
                matches!(tokens.verify(&altered), Err(TokenError::Invalid)),
                "byte {index} altered"
            );
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = service("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%")
            .issue(UserId::new(7))
            .unwrap();
        let other = service("Zr5!mQ8@wE2#tY6$uI9%oP3^aS7&dF1*");
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%");
        assert!(matches!(tokens.verify("not-a-token"), Err(TokenError::Invalid)));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", service("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%"));
        assert!(debug.contains("[REDACTED]"));
    }
}
