use chrono::{Duration, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use infra::registration::Actor;

use crate::config::AppConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

/// Token claims. Tokens are issued by the account service; this crate only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub role: Role,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration
}

impl Claims {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Role, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id.into(),
            email: email.into(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.sub.clone(),
            is_admin: self.role == Role::Admin,
        }
    }
}

#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;
    use crate::config::AppConfig;

    fn config(secret: &str) -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/veyg".into()),
            "JWT_SECRET" => Some(secret.into()),
            _ => None,
        })
        .unwrap()
    }

    fn token(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_verify_round_trip_and_actor() {
        let service = JwtService::new(&config("s3cret"));
        let claims = Claims::new("u1", "u1@example.com", Role::Admin, 1);

        let verified = service.verify_token(&token(&claims, "s3cret")).unwrap();
        assert_eq!(verified.sub, "u1");
        let actor = verified.actor();
        assert!(actor.is_admin);
        assert_eq!(actor.user_id, "u1");
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        let service = JwtService::new(&config("s3cret"));
        let claims = Claims::new("u1", "u1@example.com", Role::Student, 1);
        assert!(matches!(
            service.verify_token(&token(&claims, "other")),
            Err(AppError::Unauthorized(_))
        ));

        let expired = Claims::new("u1", "u1@example.com", Role::Student, -2);
        assert!(service.verify_token(&token(&expired, "s3cret")).is_err());
    }
}
