//! Product catalog: storefront reads and admin CRUD.
//!
//! Stock is `Option<i32>`: a NULL column marks pre-order mode, where
//! quantity is not tracked at all.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::categories::Category;
use crate::api::variants::Variant;
use crate::api::{AppState, ListParams, PaginatedResponse};
use crate::domain::Slug;
use crate::{Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub images: Vec<String>,
    pub stock: Option<i32>,
    pub is_pre_order: bool,
    pub pre_order_eta: Option<String>,
    pub category_id: Uuid,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-form key/value row shown on the product page, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpecificationRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub key: String,
    pub value: String,
    pub position: i32,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
    pub variants: Vec<Variant>,
    pub specifications: Vec<SpecificationRow>,
}

#[derive(Debug, Deserialize)]
pub struct SpecificationInput {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 120))]
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: Option<i32>,
    #[serde(default)]
    pub is_pre_order: bool,
    pub pre_order_eta: Option<String>,
    pub category_id: Uuid,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub specifications: Vec<SpecificationInput>,
}

fn default_true() -> bool {
    true
}

impl ProductRequest {
    fn check(&self) -> Result<Slug> {
        self.validate()?;
        if self.price < Decimal::ZERO {
            return Err(StoreError::Invalid("price cannot be negative".into()));
        }
        if matches!(self.compare_at_price, Some(p) if p < Decimal::ZERO) {
            return Err(StoreError::Invalid("compare-at price cannot be negative".into()));
        }
        Ok(Slug::new(self.slug.clone())?)
    }

    /// Pre-order products track no stock; everyone else defaults to 0.
    fn resolved_stock(&self) -> Option<i32> {
        if self.is_pre_order {
            None
        } else {
            Some(self.stock.unwrap_or(0).max(0))
        }
    }

    fn resolved_eta(&self) -> Option<String> {
        if !self.is_pre_order {
            return None;
        }
        self.pre_order_eta
            .as_deref()
            .map(str::trim)
            .filter(|eta| !eta.is_empty())
            .map(String::from)
    }
}

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>> {
    let filter = "($1::uuid IS NULL OR category_id = $1) \
         AND ($2::bool IS NULL OR is_active = $2) \
         AND ($3::bool IS NULL OR is_featured = $3) \
         AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%')";

    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT * FROM products WHERE {filter} ORDER BY created_at DESC LIMIT $5 OFFSET $6"
    ))
    .bind(p.category)
    .bind(p.active)
    .bind(p.featured)
    .bind(&p.search)
    .bind(p.per_page() as i64)
    .bind(p.offset())
    .fetch_all(&s.db)
    .await?;

    let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products WHERE {filter}"))
        .bind(p.category)
        .bind(p.active)
        .bind(p.featured)
        .bind(&p.search)
        .fetch_one(&s.db)
        .await?;

    Ok(Json(PaginatedResponse {
        data: products,
        total: total.0,
        page: p.page(),
    }))
}

pub async fn get_by_id(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProductDetail>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(StoreError::NotFound("product"))?;
    Ok(Json(load_detail(&s.db, product).await?))
}

/// Storefront detail route: only active products are addressable by slug.
pub async fn get_by_slug(
    State(s): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = $1 AND is_active")
            .bind(&slug)
            .fetch_optional(&s.db)
            .await?
            .ok_or(StoreError::NotFound("product"))?;
    Ok(Json(load_detail(&s.db, product).await?))
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductDetail>)> {
    let slug = r.check()?;
    let mut tx = s.db.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, slug, description, price, compare_at_price, images, \
         stock, is_pre_order, pre_order_eta, category_id, is_featured, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(slug.as_str())
    .bind(&r.description)
    .bind(r.price)
    .bind(r.compare_at_price)
    .bind(&r.images)
    .bind(r.resolved_stock())
    .bind(r.is_pre_order)
    .bind(r.resolved_eta())
    .bind(r.category_id)
    .bind(r.is_featured)
    .bind(r.is_active)
    .fetch_one(&mut *tx)
    .await?;

    insert_specifications(&mut tx, product.id, &r.specifications).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(load_detail(&s.db, product).await?)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<ProductRequest>,
) -> Result<Json<ProductDetail>> {
    let slug = r.check()?;
    let mut tx = s.db.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET name = $2, slug = $3, description = $4, price = $5, \
         compare_at_price = $6, images = $7, stock = $8, is_pre_order = $9, \
         pre_order_eta = $10, category_id = $11, is_featured = $12, is_active = $13, \
         updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(slug.as_str())
    .bind(&r.description)
    .bind(r.price)
    .bind(r.compare_at_price)
    .bind(&r.images)
    .bind(r.resolved_stock())
    .bind(r.is_pre_order)
    .bind(r.resolved_eta())
    .bind(r.category_id)
    .bind(r.is_featured)
    .bind(r.is_active)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(StoreError::NotFound("product"))?;

    // Specification rows are replaced wholesale on every edit.
    sqlx::query("DELETE FROM product_specifications WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_specifications(&mut tx, id, &r.specifications).await?;
    tx.commit().await?;

    Ok(Json(load_detail(&s.db, product).await?))
}

pub async fn remove(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("product"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn insert_specifications(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: Uuid,
    specs: &[SpecificationInput],
) -> Result<()> {
    for spec in specs {
        sqlx::query(
            "INSERT INTO product_specifications (id, product_id, key, value, position) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(product_id)
        .bind(&spec.key)
        .bind(&spec.value)
        .bind(spec.position)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn load_detail(db: &sqlx::PgPool, product: Product) -> Result<ProductDetail> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(product.category_id)
        .fetch_one(db)
        .await?;
    let variants = sqlx::query_as::<_, Variant>(
        "SELECT * FROM product_variants WHERE product_id = $1 AND is_active \
         ORDER BY created_at ASC",
    )
    .bind(product.id)
    .fetch_all(db)
    .await?;
    let specifications = sqlx::query_as::<_, SpecificationRow>(
        "SELECT * FROM product_specifications WHERE product_id = $1 ORDER BY position ASC",
    )
    .bind(product.id)
    .fetch_all(db)
    .await?;

    Ok(ProductDetail {
        product,
        category,
        variants,
        specifications,
    })
}
