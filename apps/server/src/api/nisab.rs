use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use nisab_core::prices::{NisabValue, ResolveOptions};

#[derive(Debug, Deserialize)]
struct NisabQuery {
    #[serde(default)]
    fresh: bool,
    #[serde(default)]
    debug: bool,
}

async fn get_nisab(
    Query(query): Query<NisabQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<NisabValue>> {
    let options = ResolveOptions {
        bypass_cache: query.fresh,
        diagnostics: query.debug,
    };
    let value = state.resolver.resolve_nisab(options).await?;
    Ok(Json(value))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/nisab", get(get_nisab))
}
