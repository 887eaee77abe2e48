//! Identity token verification
//!
//! The application does not issue credentials. Sign-in happens against an
//! external identity provider; what arrives here is a bearer token whose
//! signature and expiry we verify before trusting any claim in it. Roles
//! are never read from the token, only from our own user records.

use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Verification failures, all of which surface as 401 at the API boundary.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid authorization token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by a verified identity token.
///
/// Field names follow the OIDC standard claim set the provider emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable subject identifier, the only claim used as a key
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    /// Expiry as a unix timestamp; checked during verification
    pub exp: i64,
}

/// Verify a bearer token's signature and expiry and return its claims.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<IdentityClaims, IdentityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
    }

    let data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}

/// Extract the bearer token from the Authorization header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config(secret: &str, issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            issuer: issuer.map(str::to_string),
        }
    }

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        email: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        iss: Option<&'a str>,
    }

    fn token(secret: &str, exp_offset: i64, iss: Option<&str>) -> String {
        let claims = TestClaims {
            sub: "ext_abc",
            email: "amina@example.org",
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iss,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_claims() {
        let config = config("s3cret", None);
        let claims = verify_token(&config, &token("s3cret", 3600, None)).unwrap();
        assert_eq!(claims.sub, "ext_abc");
        assert_eq!(claims.email.as_deref(), Some("amina@example.org"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = config("s3cret", None);
        assert!(verify_token(&config, &token("other", 3600, None)).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = config("s3cret", None);
        assert!(verify_token(&config, &token("s3cret", -3600, None)).is_err());
    }

    #[test]
    fn test_issuer_enforced_when_configured() {
        let config = config("s3cret", Some("https://id.example.org"));
        assert!(verify_token(&config, &token("s3cret", 3600, None)).is_err());
        assert!(
            verify_token(&config, &token("s3cret", 3600, Some("https://id.example.org"))).is_ok()
        );
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));
        assert!(bearer_token(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());
    }
}
