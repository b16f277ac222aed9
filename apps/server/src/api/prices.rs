use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use nisab_core::prices::PriceView;
use nisab_market_data::Instrument;

#[derive(Debug, Deserialize)]
struct PriceQuery {
    unit: Option<String>,
    #[serde(default)]
    fresh: bool,
    #[serde(default)]
    debug: bool,
}

fn wants_grams(unit: Option<&str>) -> ApiResult<bool> {
    match unit.map(|u| u.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("ounce") | Some("oz") => Ok(false),
        Some("gram") | Some("g") => Ok(true),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Unsupported unit '{}', expected 'gram' or 'ounce'",
            other
        ))),
    }
}

async fn get_price(
    Path(metal): Path<String>,
    Query(query): Query<PriceQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PriceView>> {
    let instrument: Instrument = metal.parse()?;
    let want_grams = wants_grams(query.unit.as_deref())?;

    let view = state
        .resolver
        .quote(instrument, want_grams, query.fresh, query.debug)
        .await?;
    Ok(Json(view))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/prices/{metal}", get(get_price))
}
