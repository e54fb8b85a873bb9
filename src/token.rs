//! Stateless bearer credentials. A token carries the principal id and type,
//! is signed with the process-wide symmetric key and is valid for two hours
//! from issuance. There is no revocation list; validity is purely signature
//! plus expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;

/// Fixed validity window from issuance.
pub const TOKEN_VALIDITY_SECS: i64 = 2 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Customer,
    Employee,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub typ: PrincipalKind,
    pub iat: i64,
    pub exp: i64,
}

/// The decoded, verified contents of a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pub principal_id: Uuid,
    pub kind: PrincipalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("TOKEN_INVALID")]
    BadSignature,

    #[error("TOKEN_HAS_EXPIRED")]
    Expired,

    #[error("TOKEN_MALFORMED")]
    Malformed,
}

impl TokenError {
    pub fn code(self) -> &'static str {
        match self {
            TokenError::BadSignature => "TOKEN_INVALID",
            TokenError::Expired => "TOKEN_HAS_EXPIRED",
            TokenError::Malformed => "TOKEN_MALFORMED",
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    leeway_secs: u64,
}

impl TokenCodec {
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            leeway_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_leeway_secs)
    }

    pub fn issue(&self, principal_id: Uuid, kind: PrincipalKind) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal_id.to_string(),
            typ: kind,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_VALIDITY_SECS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Malformed)
    }

    /// Signature is checked strictly; the leeway window applies only to the
    /// expiry claim.
    pub fn verify(&self, token: &str) -> Result<Credential, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
                match err.kind() {
                    ErrorKind::InvalidSignature => TokenError::BadSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?;

        let principal_id =
            Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)?;

        Ok(Credential {
            principal_id,
            kind: data.claims.typ,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expired_token(codec_secret: &str, age_secs: i64) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            typ: PrincipalKind::Customer,
            iat: (now - Duration::seconds(age_secs + 60)).timestamp(),
            exp: (now - Duration::seconds(age_secs)).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(codec_secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let codec = TokenCodec::new("test-secret", 0);
        let id = Uuid::new_v4();
        let token = codec.issue(id, PrincipalKind::Employee).unwrap();
        let credential = codec.verify(&token).unwrap();
        assert_eq!(credential.principal_id, id);
        assert_eq!(credential.kind, PrincipalKind::Employee);
    }

    #[test]
    fn expired_token_reports_expiry_not_signature() {
        let codec = TokenCodec::new("test-secret", 0);
        let token = expired_token("test-secret", 3600);
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn leeway_applies_to_expiry_only() {
        let codec = TokenCodec::new("test-secret", 120);
        // Just past expiry, inside the leeway window.
        let token = expired_token("test-secret", 10);
        assert!(codec.verify(&token).is_ok());

        // Leeway never excuses a bad signature.
        let forged = expired_token("other-secret", 10);
        assert_eq!(codec.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_signature_is_distinct_from_expiry() {
        let codec = TokenCodec::new("test-secret", 0);
        let other = TokenCodec::new("other-secret", 0);
        let token = other.issue(Uuid::new_v4(), PrincipalKind::Customer).unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = TokenCodec::new("test-secret", 0);
        assert_eq!(codec.verify("not-a-jwt"), Err(TokenError::Malformed));
    }
}
