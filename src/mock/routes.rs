use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    Json,
};
use log::{debug, warn};
use serde_json::Value;
use tokio::sync::RwLock;

use super::store::{Record, Store};
use crate::client::TOTAL_COUNT_HEADER;

/// Shared application state passed to all Axum handlers via `.with_state()`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

type HandlerError = (StatusCode, String);

fn not_found(id: &str) -> HandlerError {
    warn!("Product {} not found", id);
    (StatusCode::NOT_FOUND, format!("Product {} not found", id))
}

/// GET /products?field=value&field_gte=n&_sort=f&_order=asc&_page=1&_limit=10
/// Returns the page of matching products and the full match count in X-Total-Count
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> (HeaderMap, Json<Vec<Record>>) {
    let listing = state.store.read().await.list_products(&params);
    debug!(
        "Listing {} of {} products for {:?}",
        listing.items.len(),
        listing.total_count,
        params
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-total-count"),
        HeaderValue::from(listing.total_count),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(TOTAL_COUNT_HEADER),
    );

    (headers, Json(listing.items))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, HandlerError> {
    let store = state.store.read().await;
    match store.get_product(&id) {
        Some(record) => Ok(Json(record.clone())),
        None => Err(not_found(&id)),
    }
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(record): Json<Record>,
) -> (StatusCode, Json<Record>) {
    let created = state.store.write().await.insert_product(record);
    debug!("Created product {:?}", created.get("id"));
    (StatusCode::CREATED, Json(created))
}

/// PATCH /products/{id}
/// Shallow merge of the request body into the stored product
pub async fn patch_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<Record>,
) -> Result<Json<Record>, HandlerError> {
    match state.store.write().await.patch_product(&id, changes) {
        Some(record) => Ok(Json(record)),
        None => Err(not_found(&id)),
    }
}

/// GET /brands
pub async fn list_brands(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.store.read().await.brands.clone())
}

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.store.read().await.categories.clone())
}

pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
