use crate::domain::{DomainError, Requester};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: usize,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl_hours: i64) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::InternalError(
                "JWT secret cannot be empty".to_string(),
            ));
        }

        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is too short ({} chars). Minimum recommended is 32 chars.",
                secret.len()
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        })
    }

    pub fn generate_token(&self, user_id: i64, username: String) -> Result<String, DomainError> {
        tracing::debug!(
            "Generating token for user_id: {}, username: {}",
            user_id,
            username
        );

        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| DomainError::InternalError("Token expiry overflow".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            user_id,
            username,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {}", e);
            DomainError::InternalError(format!("Failed to generate token: {}", e))
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Requester, DomainError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                tracing::debug!("Token verified for user_id: {}", token_data.claims.user_id);
                Ok(Requester {
                    id: token_data.claims.user_id,
                    username: token_data.claims.username,
                })
            }
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                Err(DomainError::Unauthorized(format!("Invalid token: {}", e)))
            }
        }
    }
}
