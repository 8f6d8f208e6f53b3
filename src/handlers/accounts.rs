use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::AppError;
use crate::middleware::auth::AuthenticatedAccount;
use crate::models::account::{Account, CreateAccountRequest, UpdateAccountRequest};
use crate::util::run_blocking;
use crate::AppState;

/// POST /account — open a new account.
pub async fn create_account(
    State(state): State<AppState>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    tracing::info!(handler = "create_account", "Handler: POST /account");

    body.validate()?;

    let account = run_blocking(move || {
        Account::new(&body.first_name, &body.last_name, &body.password)
    })
    .await??;

    tracing::debug!(handler = "create_account", account_id = %account.id, "Dispatching to repo.create_account");
    state.repo.create_account(&account).await?;

    tracing::info!(
        handler = "create_account",
        account_id = %account.id,
        number = account.number,
        status = 201,
        "Responding: account created"
    );

    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /account — list every account.
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "list_accounts", caller = caller.number, "Handler: GET /account");

    let accounts = state.repo.get_accounts().await?;

    tracing::info!(
        handler = "list_accounts",
        count = accounts.len(),
        status = 200,
        "Responding: accounts listed"
    );

    Ok(Json(accounts))
}

/// GET /account/{id}
pub async fn get_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "get_account", caller = caller.number, account_id = %id, "Handler: GET /account/{{id}}");

    let account = state.repo.get_account_by_id(&id).await?;

    Ok(Json(account))
}

/// DELETE /account/{id} — responds with the record that was removed.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "delete_account", caller = caller.number, account_id = %id, "Handler: DELETE /account/{{id}}");

    let account = state.repo.get_account_by_id(&id).await?;

    let deleted = state.repo.delete_account(&id).await?;
    tracing::debug!(handler = "delete_account", deleted, "Repo returned");

    if !deleted {
        // Removed by a concurrent request between lookup and delete.
        return Err(AppError::NotFound(format!("Account {id} not found")));
    }

    tracing::info!(
        handler = "delete_account",
        account_id = %id,
        status = 200,
        "Responding: account deleted"
    );

    Ok(Json(account))
}

/// POST /account/update — full-record replace.
pub async fn update_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    body: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    tracing::info!(handler = "update_account", caller = caller.number, account_id = %body.id, "Handler: POST /account/update");

    body.validate()?;

    let account = run_blocking(move || {
        Account::rebuilt(
            &body.id,
            &body.first_name,
            &body.last_name,
            &body.password,
            body.number,
            body.balance,
        )
    })
    .await??;

    if !state.repo.update_account(&account).await? {
        return Err(AppError::NotFound(format!("Account {} not found", account.id)));
    }

    tracing::info!(
        handler = "update_account",
        account_id = %account.id,
        status = 201,
        "Responding: account replaced"
    );

    Ok((StatusCode::CREATED, Json(account)))
}
