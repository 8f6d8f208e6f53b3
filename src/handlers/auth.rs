use axum::{extract::rejection::JsonRejection, extract::State, response::IntoResponse, Json};

use crate::error::AppError;
use crate::models::account::{verify_dummy_password, LoginRequest, LoginResponse};
use crate::util::run_blocking;
use crate::AppState;

/// POST /login — exchange account number and password for a session token.
/// Numbers are not unique, so every holder of the number is tried. A number
/// with no holder still pays for one Argon2 verification, keeping unknown
/// numbers and wrong passwords alike in both body and timing.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let number = body.number;
    tracing::info!(handler = "login", number, "Handler: POST /login");

    let candidates = state.repo.get_accounts_by_number(number).await?;
    let known = !candidates.is_empty();
    tracing::debug!(handler = "login", number, candidates = candidates.len(), "Repo returned");

    let password = body.password;
    let matched = run_blocking(move || {
        if candidates.is_empty() {
            verify_dummy_password(&password);
            return None;
        }
        candidates
            .into_iter()
            .find(|account| account.verify_password(&password))
    })
    .await?;

    let Some(account) = matched else {
        if known {
            tracing::warn!(handler = "login", number, "Login failed: wrong password");
        } else {
            tracing::warn!(handler = "login", number, "Login failed: unknown number");
        }
        return Err(AppError::Unauthorized);
    };

    let token = state.keys.issue_token(&account)?;

    tracing::info!(
        handler = "login",
        number = account.number,
        account_id = %account.id,
        status = 200,
        "Responding: token issued"
    );

    Ok(Json(LoginResponse {
        token,
        number: account.number,
    }))
}
