//! REST client for the storefront backend.
//!
//! Every operation issues a single request (an update issues a re-check
//! first) and hands failures straight back to the caller. There is no retry,
//! no cache and no shared state between calls beyond the connection pool
//! inside `reqwest::Client`.
use log::{debug, Level};
use logging_timer::timer;
use reqwest::{header::HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::catalog::{Brand, Category};
use crate::config::BackendConfig;
use crate::error::{Result, ShopError};
use crate::products::{
    visible, Product, ProductDraft, ProductId, ProductPatch, ProductQueryResult, SoftDelete,
};
use crate::query::ProductQuery;

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

pub const PRODUCTS_PATH: &str = "/products";
pub const BRANDS_PATH: &str = "/brands";
pub const CATEGORIES_PATH: &str = "/categories";

#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(backend: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = backend.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self::with_http(&backend.base_url, http))
    }

    /// Use an already configured `reqwest::Client`.
    pub fn with_http(base_url: &str, http: reqwest::Client) -> Self {
        StoreClient {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Path and query for a product search, relative to the base url.
    pub fn products_path(query: &ProductQuery) -> String {
        format!("{}?{}", PRODUCTS_PATH, query.to_query_string())
    }

    fn product_path(id: &ProductId) -> String {
        format!("{}/{}", PRODUCTS_PATH, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let resp = self.http.get(self.url(path)).send().await?.error_for_status()?;
        Ok(resp.json::<T>().await?)
    }

    /// Search products. Soft-deleted rows are dropped; the total count is the
    /// backend's `X-Total-Count` header, unadjusted.
    pub async fn fetch_products(&self, query: &ProductQuery) -> Result<ProductQueryResult> {
        let _tmr = timer!(Level::Trace; "StoreClient::fetch_products");

        let path = Self::products_path(query);
        debug!("GET {}", path);

        let resp = self
            .http
            .get(self.url(&path))
            .send()
            .await?
            .error_for_status()?;

        let total_count = total_count(resp.headers())?;
        let raw: Vec<Product> = resp.json().await?;

        debug!(
            "Fetched {} products ({} total reported by backend)",
            raw.len(),
            total_count
        );

        Ok(ProductQueryResult::from_raw(raw, total_count))
    }

    /// Every product, without filtering or paging. Soft-deleted rows are dropped.
    pub async fn fetch_all_products(&self) -> Result<Vec<Product>> {
        let _tmr = timer!(Level::Trace; "StoreClient::fetch_all_products");
        let raw: Vec<Product> = self.get_json(PRODUCTS_PATH).await?;
        Ok(visible(raw))
    }

    pub async fn fetch_brands(&self) -> Result<Vec<Brand>> {
        self.get_json(BRANDS_PATH).await
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        self.get_json(CATEGORIES_PATH).await
    }

    /// Fetch one product. A soft-deleted product is reported as not found.
    pub async fn fetch_product_by_id(&self, id: &ProductId) -> Result<Product> {
        let _tmr = timer!(Level::Trace; "StoreClient::fetch_product_by_id", "{}", id);

        let path = Self::product_path(id);
        debug!("GET {}", path);

        let resp = self.http.get(self.url(&path)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(not_found(id));
        }

        let product: Product = resp.error_for_status()?.json().await?;
        if product.is_deleted() {
            debug!("Product {} is soft-deleted", id);
            return Err(not_found(id));
        }

        Ok(product)
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        let _tmr = timer!(Level::Trace; "StoreClient::create_product");
        debug!("POST {}", PRODUCTS_PATH);

        let resp = self
            .http
            .post(self.url(PRODUCTS_PATH))
            .json(draft)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    /// Apply a partial update. The product is re-fetched first; if it is gone
    /// or soft-deleted nothing is written and `NotFound` is returned.
    pub async fn update_product(&self, id: &ProductId, patch: &ProductPatch) -> Result<Product> {
        let _tmr = timer!(Level::Trace; "StoreClient::update_product", "{}", id);

        self.fetch_product_by_id(id).await?;

        let path = Self::product_path(id);
        debug!("PATCH {}", path);

        let resp = self
            .http
            .patch(self.url(&path))
            .json(patch)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    /// Flag the product as deleted. The record stays on the backend.
    pub async fn soft_delete_product(&self, id: ProductId) -> Result<ProductId> {
        let _tmr = timer!(Level::Trace; "StoreClient::soft_delete_product", "{}", id);

        let path = Self::product_path(&id);
        debug!("PATCH {} (soft delete)", path);

        self.http
            .patch(self.url(&path))
            .json(&SoftDelete::BODY)
            .send()
            .await?
            .error_for_status()?;

        Ok(id)
    }
}

fn not_found(id: &ProductId) -> ShopError {
    ShopError::NotFound(format!("Product {} not found", id))
}

fn total_count(headers: &HeaderMap) -> Result<u64> {
    let value = headers.get(TOTAL_COUNT_HEADER).ok_or_else(|| {
        ShopError::InvalidResponse(format!("missing {} header", TOTAL_COUNT_HEADER))
    })?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            ShopError::InvalidResponse(format!(
                "{} header is not a count: {:?}",
                TOTAL_COUNT_HEADER, value
            ))
        })
}
