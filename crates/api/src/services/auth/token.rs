//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use emporium_core::{Email, Role, UserId};

use super::AuthError;

/// Claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and checks bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for a user, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn issue(&self, user_id: UserId, email: &Email, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.as_str().to_owned(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    /// Check signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for an expired token and
    /// `AuthError::InvalidToken` for anything else wrong with it.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret.to_string()), 24)
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = issuer("Zq8#wL2!pN6@vR1$kT4%yB7^mC3&xF9*");
        let user_id = UserId::generate();
        let email = Email::parse("priya@example.in").unwrap();

        let token = tokens.issue(user_id, &email, Role::Admin).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "priya@example.in");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_token_is_distinct() {
        let tokens = issuer("Zq8#wL2!pN6@vR1$kT4%yB7^mC3&xF9*");
        let now = Utc::now().timestamp();
        let token = tokens
            .sign(&Claims {
                sub: UserId::generate(),
                email: "old@example.in".to_string(),
                role: Role::Customer,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_and_garbage_are_invalid() {
        let a = issuer("Zq8#wL2!pN6@vR1$kT4%yB7^mC3&xF9*");
        let b = issuer("Hj5&dS0!qW3@eR8#tY1$uI6%oP9^aZ2*");
        let token = a
            .issue(
                UserId::generate(),
                &Email::parse("x@example.in").unwrap(),
                Role::Customer,
            )
            .unwrap();

        assert!(matches!(b.verify(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(a.verify("not.a.jwt"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let output = format!("{:?}", issuer("Zq8#wL2!pN6@vR1$kT4%yB7^mC3&xF9*"));
        assert!(!output.contains("Zq8#"));
    }
}
