//! HTTP surface: storefront reads, admin CRUD, checkout handoff, uploads.

pub mod accounting;
pub mod categories;
pub mod checkout;
pub mod products;
pub mod uploads;
pub mod variants;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::media;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub http: reqwest::Client,
    pub config: Config,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).min(100)
    }

    pub fn offset(&self) -> i64 {
        ((self.page() - 1) * self.per_page()) as i64
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/products", get(products::list).post(products::create))
        .route(
            "/api/v1/products/:id",
            get(products::get_by_id).put(products::update).delete(products::remove),
        )
        .route("/api/v1/products/slug/:slug", get(products::get_by_slug))
        .route(
            "/api/v1/products/:id/variants",
            get(variants::list).post(variants::create),
        )
        .route("/api/v1/variants/:id", put(variants::update).delete(variants::remove))
        .route(
            "/api/v1/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/v1/categories/:id",
            get(categories::get).put(categories::update).delete(categories::remove),
        )
        .route(
            "/api/v1/accounting/sales",
            get(accounting::list_sales).post(accounting::create_sale),
        )
        .route("/api/v1/accounting/sales/:id", delete(accounting::remove_sale))
        .route(
            "/api/v1/accounting/expenses",
            get(accounting::list_expenses).post(accounting::create_expense),
        )
        .route(
            "/api/v1/accounting/expenses/:id",
            delete(accounting::remove_expense),
        )
        .route(
            "/api/v1/accounting/external-items",
            get(accounting::list_external_items).post(accounting::create_external_item),
        )
        .route("/api/v1/accounting/summary", get(accounting::summary))
        .route("/api/v1/accounting/reset", post(accounting::reset))
        .route("/api/v1/checkout/whatsapp", post(checkout::whatsapp))
        .route("/api/v1/uploads", post(uploads::upload_image))
        .layer(DefaultBodyLimit::max(media::MAX_IMAGE_BYTES + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "aurea-storefront"}))
}
