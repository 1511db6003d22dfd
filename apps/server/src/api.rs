use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    auth,
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{Instrument, InstrumentUpdate, NewInstrument, Price},
};
use marketdeck_core::instruments as core_instruments;
use marketdeck_core::instruments::InstrumentStore;
use marketdeck_core::prices::PriceStore;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

// ===================== Instruments =====================

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Validate shared limit/offset query parameters.
fn page_params(limit: Option<i64>, offset: Option<i64>) -> ApiResult<(i64, i64)> {
    let limit = limit.unwrap_or(100);
    if !(1..=1000).contains(&limit) {
        return Err(ApiError::BadRequest(
            "limit must be between 1 and 1000".to_string(),
        ));
    }
    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::BadRequest(
            "offset must be non-negative".to_string(),
        ));
    }
    Ok((limit, offset))
}

#[utoipa::path(get, path = "/api/v1/instruments", responses((status = 200, body = [Instrument])))]
async fn list_instruments(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Vec<Instrument>>> {
    let (limit, offset) = page_params(q.limit, q.offset)?;
    let instruments = state.instruments.get_all(limit, offset)?;
    Ok(Json(instruments.into_iter().map(Instrument::from).collect()))
}

#[utoipa::path(post, path = "/api/v1/instruments", request_body = NewInstrument, responses((status = 201, body = Instrument), (status = 409, description = "Symbol already exists")))]
async fn create_instrument(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewInstrument>,
) -> ApiResult<(StatusCode, Json<Instrument>)> {
    let core_new: core_instruments::NewInstrument =
        payload.try_into().map_err(ApiError::BadRequest)?;
    core_new.validate()?;

    if state.instruments.get_by_symbol(&core_new.symbol)?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Instrument with symbol '{}' already exists",
            core_new.symbol
        )));
    }

    // A concurrent create racing past the check above still lands on the
    // symbol's unique constraint and maps to 409.
    let created = state.instruments.create(core_new).await?;
    Ok((StatusCode::CREATED, Json(Instrument::from(created))))
}

#[utoipa::path(get, path = "/api/v1/instruments/{id}", responses((status = 200, body = Instrument), (status = 404, description = "Not found")))]
async fn get_instrument(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Instrument>> {
    state
        .instruments
        .get_by_id(id)?
        .map(|i| Json(Instrument::from(i)))
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(patch, path = "/api/v1/instruments/{id}", request_body = InstrumentUpdate, responses((status = 200, body = Instrument), (status = 404, description = "Not found")))]
async fn update_instrument(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InstrumentUpdate>,
) -> ApiResult<Json<Instrument>> {
    let changes: core_instruments::InstrumentUpdate =
        payload.try_into().map_err(ApiError::BadRequest)?;
    let updated = state.instruments.update(id, changes).await?;
    Ok(Json(Instrument::from(updated)))
}

#[utoipa::path(delete, path = "/api/v1/instruments/{id}", responses((status = 204), (status = 404, description = "Not found")))]
async fn delete_instrument(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    // Price records go with it (storage cascades on the foreign key)
    state.instruments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===================== Prices =====================

#[derive(Deserialize)]
struct PriceQuery {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[utoipa::path(get, path = "/api/v1/instruments/{id}/prices", responses((status = 200, body = [Price]), (status = 404, description = "Instrument not found")))]
async fn get_instrument_prices(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<PriceQuery>,
) -> ApiResult<Json<Vec<Price>>> {
    if state.instruments.get_by_id(id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    let (limit, offset) = page_params(q.limit, q.offset)?;

    // The date filter applies only when both bounds are supplied (inclusive
    // on both ends); pagination is applied on top of the filtered range.
    let records = match (q.start_date, q.end_date) {
        (Some(start), Some(end)) => state
            .prices
            .get_by_date_range(id, start, end)?
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect(),
        _ => state.prices.get_by_instrument(id, limit, offset)?,
    };

    Ok(Json(records.into_iter().map(Price::from).collect()))
}

#[utoipa::path(get, path = "/api/v1/instruments/{id}/prices/latest", responses((status = 200, body = Price), (status = 404, description = "Instrument or price not found")))]
async fn get_latest_price(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Price>> {
    if state.instruments.get_by_id(id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    state
        .prices
        .get_latest(id)?
        .map(|p| Json(Price::from(p)))
        .ok_or(ApiError::NotFound)
}

// ===================== Router =====================

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        readyz,
        list_instruments,
        create_instrument,
        get_instrument,
        update_instrument,
        delete_instrument,
        get_instrument_prices,
        get_latest_price
    ),
    components(schemas(Instrument, NewInstrument, InstrumentUpdate, Price)),
    tags((name = "marketdeck"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .map(|o| o.parse().unwrap())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    let public = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/auth/login", axum::routing::post(auth::login))
        .route("/auth/status", get(auth::auth_status));

    // Note: ingestion is schedule-driven only; nothing here triggers it.
    let protected = Router::new()
        .route(
            "/instruments",
            get(list_instruments).post(create_instrument),
        )
        .route(
            "/instruments/{id}",
            get(get_instrument)
                .patch(update_instrument)
                .delete(delete_instrument),
        )
        .route("/instruments/{id}/prices", get(get_instrument_prices))
        .route(
            "/instruments/{id}/prices/latest",
            get(get_latest_price),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_jwt,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
