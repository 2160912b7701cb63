//! Category CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::domain::Slug;
use crate::{Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CategoryRequest {
    fn resolved_slug(&self) -> Result<Slug> {
        Ok(match &self.slug {
            Some(slug) => Slug::new(slug.clone())?,
            None => Slug::from_name(&self.name)?,
        })
    }
}

pub async fn list(State(s): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&s.db)
        .await?;
    Ok(Json(categories))
}

pub async fn get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(StoreError::NotFound("category"))
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    r.validate()?;
    let slug = r.resolved_slug()?;
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, description, image_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(slug.as_str())
    .bind(&r.description)
    .bind(&r.image_url)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CategoryRequest>,
) -> Result<Json<Category>> {
    r.validate()?;
    let slug = r.resolved_slug()?;
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2, slug = $3, description = $4, image_url = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(slug.as_str())
    .bind(&r.description)
    .bind(&r.image_url)
    .fetch_optional(&s.db)
    .await?
    .ok_or(StoreError::NotFound("category"))?;
    Ok(Json(category))
}

/// A category that still has products cannot be deleted.
pub async fn remove(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let products: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(&s.db)
            .await?;
    if products.0 > 0 {
        return Err(StoreError::CategoryInUse);
    }
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("category"));
    }
    Ok(StatusCode::NO_CONTENT)
}
