use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::error::AppError;

const MAX_NAME_LEN: usize = 100;
const MAX_PASSWORD_LEN: usize = 128;
const ACCOUNT_NUMBER_RANGE: i64 = 1_000_000;
const INITIAL_BALANCE_RANGE: i64 = 100_000;

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Account as stored and as sent over the wire. The credential is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub balance: i64, // minor units
    #[serde(skip_serializing)]
    pub encrypted_password: String,
    #[sqlx(rename = "create_at")]
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh account with a generated id, random number and opening balance.
    pub fn new(first_name: &str, last_name: &str, password: &str) -> Result<Self, AppError> {
        let encrypted_password = hash_password(password)?;
        let mut rng = rand::thread_rng();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            number: rng.gen_range(0..ACCOUNT_NUMBER_RANGE),
            balance: rng.gen_range(0..INITIAL_BALANCE_RANGE),
            encrypted_password,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a full record for a replace. The password is always re-hashed and
    /// `created_at` is restamped; the stored creation time is not carried over.
    pub fn rebuilt(
        id: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
        number: i64,
        balance: i64,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            number,
            balance,
            encrypted_password: hash_password(password)?,
            created_at: Utc::now(),
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.encrypted_password) else {
            tracing::warn!(account_id = %self.id, "Stored credential is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Spend one Argon2 verification when no account matched, so a miss on the
/// account number costs the same as a wrong password.
pub fn verify_dummy_password(password: &str) {
    if let Ok(parsed) = PasswordHash::new(dummy_hash()) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
}

fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| hash_password("gobank-dummy-credential").unwrap_or_default())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::CredentialHashing(e.to_string()))
}

fn validate_name(field: &str, value: &str) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{field} length must be 1-{MAX_NAME_LEN}, got {len}"
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.is_empty() || password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password length must be 1-{MAX_PASSWORD_LEN} bytes"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl CreateAccountRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_password(&self.password)
    }
}

/// Body of a full-record replace.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub number: i64,
    pub balance: i64,
}

impl UpdateAccountRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id.trim().is_empty() {
            return Err(AppError::Validation("id must not be empty".into()));
        }
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub number: i64,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub number: i64,
}

/// Transfers are echoed back; no balance is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferRequest {
    pub to_account: i64,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_hashes_password() {
        let acc = Account::new("Ana", "Lima", "s3cr3t").unwrap();
        assert_ne!(acc.encrypted_password, "s3cr3t");
        assert!(acc.encrypted_password.starts_with("$argon2id$"));
        assert!(acc.verify_password("s3cr3t"));
        assert!(!acc.verify_password("wrong"));
    }

    #[test]
    fn test_new_account_number_and_balance_in_range() {
        let acc = Account::new("Ana", "Lima", "s3cr3t").unwrap();
        assert!((0..ACCOUNT_NUMBER_RANGE).contains(&acc.number));
        assert!((0..INITIAL_BALANCE_RANGE).contains(&acc.balance));
        assert!(Uuid::parse_str(&acc.id).is_ok());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = Account::new("Ana", "Lima", "s3cr3t").unwrap();
        let b = Account::new("Ana", "Lima", "s3cr3t").unwrap();
        assert_ne!(a.encrypted_password, b.encrypted_password);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_rebuilt_rehashes_and_keeps_identity() {
        let acc = Account::rebuilt("abc", "Ana", "Souza", "n3w", 42, 500).unwrap();
        assert_eq!(acc.id, "abc");
        assert_eq!(acc.number, 42);
        assert_eq!(acc.balance, 500);
        assert!(acc.verify_password("n3w"));
    }

    #[test]
    fn test_serialized_account_hides_credential() {
        let acc = Account::new("Ana", "Lima", "s3cr3t").unwrap();
        let value = serde_json::to_value(&acc).unwrap();
        assert!(value.get("encrypted_password").is_none());
        assert!(value.get("password").is_none());
        assert_eq!(value["first_name"], "Ana");
        assert_eq!(value["number"], acc.number);
    }

    #[test]
    fn test_verify_against_garbage_hash_is_false() {
        let mut acc = Account::new("Ana", "Lima", "s3cr3t").unwrap();
        acc.encrypted_password = "not-a-hash".into();
        assert!(!acc.verify_password("s3cr3t"));
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateAccountRequest {
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            password: "s3cr3t".into(),
        };
        assert!(ok.validate().is_ok());

        let blank = CreateAccountRequest {
            first_name: "  ".into(),
            ..ok
        };
        assert!(matches!(blank.validate(), Err(AppError::Validation(_))));

        let long_password = CreateAccountRequest {
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            password: "x".repeat(MAX_PASSWORD_LEN + 1),
        };
        assert!(matches!(long_password.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_request_bodies_reject_unknown_fields() {
        assert!(serde_json::from_str::<CreateAccountRequest>(
            r#"{"first_name":"Ana","last_name":"Lima","password":"x","balance":9}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<UpdateAccountRequest>(
            r#"{"id":"a","first_name":"Ana","last_name":"Lima","password":"x","number":1,"balance":9,"admin":true}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<LoginRequest>(
            r#"{"number":1,"password":"x","remember":true}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<TransferRequest>(
            r#"{"to_account":1,"amount":5,"from_account":2}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<TransferRequest>(r#"{"to_account":1,"amount":5}"#).is_ok());
    }

    #[test]
    fn test_dummy_hash_is_a_real_argon2_hash() {
        assert!(dummy_hash().starts_with("$argon2id$"));
        // Must not panic for any input.
        verify_dummy_password("anything");
        verify_dummy_password("");
    }
}
