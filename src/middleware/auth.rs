use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::util::token_prefix;
use crate::AppState;

pub const TOKEN_HEADER: &str = "x-token";

/// Guard for protected routes. Reads the signed token from `X-Token`, verifies
/// signature, algorithm and expiry, and only then runs the wrapped handler.
/// Every failure answers 403 without touching the handler.
pub async fn require_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|s| s.to_string());

    let Some(token) = token else {
        tracing::warn!(
            method = %method,
            uri = %uri,
            "Auth middleware: rejected, missing X-Token header"
        );
        return AppError::Unauthorized.into_response();
    };

    match state.keys.validate_token(&token) {
        Ok(claims) => {
            tracing::debug!(
                token = %token_prefix(&token),
                account_number = claims.account_number,
                method = %method,
                uri = %uri,
                "Auth middleware: token valid, forwarding to handler"
            );
            req.extensions_mut().insert(AuthenticatedAccount {
                number: claims.account_number,
            });
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(
                token = %token_prefix(&token),
                method = %method,
                uri = %uri,
                error = %e,
                "Auth middleware: rejected"
            );
            e.into_response()
        }
    }
}

/// Account number proven by the request's token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAccount {
    pub number: i64,
}
