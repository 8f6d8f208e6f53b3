//! Session tokens: HMAC-signed JWTs carrying the account number.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;
use crate::models::account::Account;

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub account_number: i64,
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(config: &Config) -> Self {
        Self::from_secret(config.jwt_secret.as_bytes())
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        // Only the HMAC family is accepted; `none` and asymmetric algorithms fail.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue_token(&self, account: &Account) -> Result<String, AppError> {
        self.issue_token_at(account.number, Utc::now())
    }

    pub fn issue_token_at(
        &self,
        account_number: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            account_number,
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::TokenIssue(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::from_secret(b"test-secret")
    }

    #[test]
    fn test_issued_token_validates() {
        let keys = keys();
        let token = keys.issue_token_at(521514, Utc::now()).unwrap();
        let claims = keys.validate_token(&token).unwrap();
        assert_eq!(claims.account_number, 521514);
    }

    #[test]
    fn test_expiry_is_24_hours_out() {
        let keys = keys();
        let now = Utc::now();
        let token = keys.issue_token_at(1, now).unwrap();
        let claims = keys.validate_token(&token).unwrap();
        assert_eq!(claims.exp, now.timestamp() + 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let token = keys
            .issue_token_at(1, Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(
            keys.validate_token(&token),
            Err(AppError::ExpiredToken)
        ));
    }

    #[test]
    fn test_token_still_valid_just_inside_window() {
        let keys = keys();
        let token = keys
            .issue_token_at(1, Utc::now() - Duration::hours(23))
            .unwrap();
        assert!(keys.validate_token(&token).is_ok());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let keys = keys();
        let token = keys.issue_token_at(1, Utc::now()).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        let i = sig_start + 5;
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            keys.validate_token(&tampered),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = keys().issue_token_at(1, Utc::now()).unwrap();
        let other = TokenKeys::from_secret(b"another-secret");
        assert!(matches!(
            other.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        // {"alg":"none","typ":"JWT"}.{"accountNumber":1,"exp":9999999999}.
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
                     eyJhY2NvdW50TnVtYmVyIjoxLCJleHAiOjk5OTk5OTk5OTl9.";
        assert!(matches!(
            keys().validate_token(token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_other_hmac_variant_accepted() {
        let claims = Claims {
            account_number: 9,
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(keys().validate_token(&token).unwrap(), claims);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            keys().validate_token("not.a.jwt"),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(keys().validate_token(""), Err(AppError::InvalidToken)));
    }
}
