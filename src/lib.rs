//! Áurea Storefront
//!
//! Direct-to-WhatsApp e-commerce: customers browse the catalog, build a cart
//! held entirely client-side, and check out by opening a pre-filled WhatsApp
//! message to the shop. Administrators manage the catalog and a lightweight
//! accounting ledger through the same service.
//!
//! ## Features
//! - Product catalog with categories, variants and specification rows
//! - Client-held shopping cart (the service stores no cart entity)
//! - WhatsApp checkout handoff
//! - Accounting ledger (sales and expenses) with guarded stock decrement
//! - Image uploads forwarded to the media host

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod media;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("insufficient stock: {available} unit(s) available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("cannot delete a category that still has products")]
    CategoryInUse,

    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),

    #[error("image exceeds the {limit_mib} MiB upload limit")]
    ImageTooLarge { limit_mib: u64 },

    #[error("media host error: {0}")]
    MediaHost(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Invalid(errors.to_string())
    }
}

impl From<crate::domain::value_objects::SlugError> for StoreError {
    fn from(err: crate::domain::value_objects::SlugError) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Invalid(_)
            | Self::InsufficientStock { .. }
            | Self::UnsupportedImageType(_)
            | Self::ImageTooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::CategoryInUse => StatusCode::CONFLICT,
            Self::MediaHost(_) => StatusCode::BAD_GATEWAY,
            Self::Database(err) => {
                tracing::error!("database error: {err}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
