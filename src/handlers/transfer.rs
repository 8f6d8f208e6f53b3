use axum::{extract::rejection::JsonRejection, response::IntoResponse, Extension, Json};

use crate::error::AppError;
use crate::middleware::auth::AuthenticatedAccount;
use crate::models::account::TransferRequest;

/// POST /transfer — echoes the request. No balance changes.
pub async fn transfer(
    Extension(caller): Extension<AuthenticatedAccount>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    tracing::info!(
        handler = "transfer",
        caller = caller.number,
        to_account = body.to_account,
        amount = body.amount,
        "Handler: POST /transfer (echo)"
    );

    Ok(Json(body))
}
