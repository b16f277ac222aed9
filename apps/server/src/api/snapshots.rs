use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use nisab_core::prices::RefreshOutcome;

const SECRET_HEADER: &str = "x-snapshot-secret";

#[derive(Debug, Serialize)]
struct RefreshResponse {
    results: Vec<RefreshOutcome>,
}

/// Compare without short-circuiting on the first differing byte.
fn secrets_match(expected: &str, given: &str) -> bool {
    let (a, b) = (expected.as_bytes(), given.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.snapshot_secret.as_deref() else {
        return Err(ApiError::NotFound);
    };

    let given = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if secrets_match(expected, given) {
        Ok(())
    } else {
        tracing::warn!("Rejected snapshot refresh with missing or wrong secret");
        Err(ApiError::Unauthorized("Invalid snapshot secret".to_string()))
    }
}

async fn refresh_snapshots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RefreshResponse>> {
    authorize(&state, &headers)?;
    let results = state.resolver.refresh_snapshots().await;
    Ok(Json(RefreshResponse { results }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/snapshots/refresh", post(refresh_snapshots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cres"));
        assert!(!secrets_match("s3cret", "s3cret!"));
        assert!(!secrets_match("s3cret", ""));
    }
}
