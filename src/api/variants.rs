//! Product variant CRUD. A variant is a color/size combination that may
//! override the parent product's price, stock and images.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::{Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Variant {
    /// Human-readable label carried into cart lines, e.g. "Rojo - M".
    pub fn label(&self) -> String {
        match (self.color.as_deref(), self.size.as_deref()) {
            (Some(color), Some(size)) => format!("{color} - {size}"),
            (Some(color), None) => color.to_string(),
            (None, Some(size)) => size.to_string(),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VariantRequest {
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl VariantRequest {
    fn check(&self) -> Result<()> {
        let has_color = matches!(self.color.as_deref(), Some(c) if !c.trim().is_empty());
        let has_size = matches!(self.size.as_deref(), Some(s) if !s.trim().is_empty());
        if !has_color && !has_size {
            return Err(StoreError::Invalid(
                "a variant needs at least a color or a size".into(),
            ));
        }
        if matches!(self.price, Some(p) if p < Decimal::ZERO) {
            return Err(StoreError::Invalid("price cannot be negative".into()));
        }
        if self.stock < 0 {
            return Err(StoreError::Invalid("stock cannot be negative".into()));
        }
        Ok(())
    }
}

pub async fn list(State(s): State<AppState>, Path(product_id): Path<Uuid>) -> Result<Json<Vec<Variant>>> {
    let variants = sqlx::query_as::<_, Variant>(
        "SELECT * FROM product_variants WHERE product_id = $1 ORDER BY created_at ASC",
    )
    .bind(product_id)
    .fetch_all(&s.db)
    .await?;
    Ok(Json(variants))
}

pub async fn create(
    State(s): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(r): Json<VariantRequest>,
) -> Result<(StatusCode, Json<Variant>)> {
    r.check()?;
    let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&s.db)
        .await?;
    if exists.0 == 0 {
        return Err(StoreError::NotFound("product"));
    }

    let variant = sqlx::query_as::<_, Variant>(
        "INSERT INTO product_variants (id, product_id, color, size, price, stock, images, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(product_id)
    .bind(&r.color)
    .bind(&r.size)
    .bind(r.price)
    .bind(r.stock)
    .bind(&r.images)
    .bind(r.is_active)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<VariantRequest>,
) -> Result<Json<Variant>> {
    r.check()?;
    let variant = sqlx::query_as::<_, Variant>(
        "UPDATE product_variants SET color = $2, size = $3, price = $4, stock = $5, \
         images = $6, is_active = $7 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.color)
    .bind(&r.size)
    .bind(r.price)
    .bind(r.stock)
    .bind(&r.images)
    .bind(r.is_active)
    .fetch_optional(&s.db)
    .await?
    .ok_or(StoreError::NotFound("variant"))?;
    Ok(Json(variant))
}

pub async fn remove(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("DELETE FROM product_variants WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("variant"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(color: Option<&str>, size: Option<&str>) -> Variant {
        Variant {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            color: color.map(String::from),
            size: size.map(String::from),
            price: None,
            stock: 0,
            images: vec![],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn label_composes_color_and_size() {
        assert_eq!(variant(Some("Rojo"), Some("M")).label(), "Rojo - M");
        assert_eq!(variant(Some("Rojo"), None).label(), "Rojo");
        assert_eq!(variant(None, Some("M")).label(), "M");
    }

    #[test]
    fn request_requires_color_or_size() {
        let r = VariantRequest {
            color: Some("  ".into()),
            size: None,
            price: None,
            stock: 0,
            images: vec![],
            is_active: true,
        };
        assert!(r.check().is_err());

        let r = VariantRequest {
            color: None,
            size: Some("M".into()),
            price: None,
            stock: 2,
            images: vec![],
            is_active: true,
        };
        assert!(r.check().is_ok());
    }
}
