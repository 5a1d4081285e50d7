//! HS256 bearer tokens carrying the caller's id, name and role.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use cms_core::config::AuthConfig;
use cms_core::error::AppError;
use cms_entity::user::{UserContext, UserRole};

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user id.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Role at the time of issuance.
    pub role: UserRole,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// The user these claims describe.
    pub fn user(&self) -> UserContext {
        UserContext::new(self.sub.clone(), self.name.clone(), self.role)
    }
}

/// Longest accepted token lifetime: ten years.
const MAX_TTL_MINUTES: u64 = 60 * 24 * 365 * 10;

/// Signs and verifies tokens with the configured secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("validation", &self.validation)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl_minutes: config.token_ttl_minutes.min(MAX_TTL_MINUTES) as i64,
        }
    }

    /// Issues a token for `user`.
    pub fn issue(&self, user: &UserContext) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.ttl_minutes)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Verifies a token's signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired")
                }
                _ => AppError::unauthorized(format!("Invalid token: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> JwtCodec {
        JwtCodec::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl_minutes: 5,
        })
    }

    #[test]
    fn test_issued_token_decodes() {
        let codec = codec("secret");
        let user = UserContext::new("u1", "Admin", UserRole::Admin);
        let claims = codec.decode(&codec.issue(&user).unwrap()).unwrap();
        assert_eq!(claims.user(), user);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let user = UserContext::new("u1", "Admin", UserRole::Admin);
        let token = codec("one").issue(&user).unwrap();
        let err = codec("two").decode(&token).unwrap_err();
        assert_eq!(err.kind, cms_core::error::ErrorKind::Unauthorized);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = codec("secret");
        let claims = Claims {
            sub: "u1".into(),
            name: "Admin".into(),
            role: UserRole::Admin,
            iat: 0,
            exp: 60,
        };
        let token = encode(&Header::default(), &claims, &codec.encoding_key).unwrap();
        assert_eq!(codec.decode(&token).unwrap_err().message, "Token has expired");
    }
}
