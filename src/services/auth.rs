use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{database::types::Role, errors::AppError};

const REMEMBER_TTL_DAYS: i64 = 365;
const SESSION_TTL_DAYS: i64 = 2;
pub const RESET_TTL_MINUTES: i64 = 5;
const RANDOM_PASSWORD_LEN: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

fn sign(secret: &str, claims: &Claims) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| {
        log::error!("Failed to sign token: {}", err);
        AppError::Internal
    })
}

/// Session token: one year when `remember` is set, two days otherwise.
pub fn issue_token(
    secret: &str,
    id: i32,
    email: &str,
    role: Role,
    remember: bool,
) -> Result<String, AppError> {
    let ttl = if remember {
        Duration::days(REMEMBER_TTL_DAYS)
    } else {
        Duration::days(SESSION_TTL_DAYS)
    };
    sign(
        secret,
        &Claims {
            id,
            email: email.to_string(),
            role,
            exp: (Utc::now() + ttl).timestamp(),
        },
    )
}

pub fn issue_reset_token(secret: &str, id: i32, email: &str, role: Role) -> Result<String, AppError> {
    sign(
        secret,
        &Claims {
            id,
            email: email.to_string(),
            role,
            exp: (Utc::now() + Duration::minutes(RESET_TTL_MINUTES)).timestamp(),
        },
    )
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Auth token expired".to_string()))
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(password, cost).map_err(|err| {
        log::error!("Failed to hash password: {}", err);
        AppError::Internal
    })
}

/// Malformed hashes count as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn random_password() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(RANDOM_PASSWORD_LEN)
        .collect()
}

/// True while a previously issued reset link is still valid.
pub fn reset_pending(pass_reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    pass_reset_at.is_some_and(|at| now - at < Duration::minutes(RESET_TTL_MINUTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn session_token_round_trips_claims() {
        let token = issue_token(SECRET, 7, "a@b.c", Role::Admin, false).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.role, Role::Admin);

        let two_days = (Utc::now() + Duration::days(2)).timestamp();
        assert!((claims.exp - two_days).abs() < 5);
    }

    #[test]
    fn remember_extends_expiry_to_a_year() {
        let token = issue_token(SECRET, 1, "a@b.c", Role::Customer, true).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();
        assert!(claims.exp > (Utc::now() + Duration::days(360)).timestamp());
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let expired = sign(
            SECRET,
            &Claims {
                id: 1,
                email: "a@b.c".into(),
                role: Role::Customer,
                exp: (Utc::now() - Duration::minutes(1)).timestamp(),
            },
        )
        .unwrap();
        let err = decode_token(SECRET, &expired).unwrap_err();
        assert_eq!(err.to_string(), "Auth token expired");

        let foreign = issue_token("other", 1, "a@b.c", Role::Customer, false).unwrap();
        assert!(decode_token(SECRET, &foreign).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22", 4).unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }

    #[test]
    fn reset_window_is_five_minutes() {
        let now = Utc::now();
        assert!(reset_pending(Some(now - Duration::minutes(2)), now));
        assert!(!reset_pending(Some(now - Duration::minutes(6)), now));
        assert!(!reset_pending(None, now));
    }

    #[test]
    fn random_passwords_are_alphanumeric() {
        let password = random_password();
        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
