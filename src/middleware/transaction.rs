use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Runs the request while holding the shared transaction lock, so stock
/// reads and read-modify-write updates never interleave
pub async fn transaction_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let _guard = state.transactions.lock().await;
    tracing::debug!("Transaction started: {} {}", request.method(), request.uri().path());

    let response = next.run(request).await;

    tracing::debug!("Transaction finished with {}", response.status());
    response
}
