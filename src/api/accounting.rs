//! Accounting ledger: sales, expenses and external items.
//!
//! Recording a sale against tracked stock decrements it atomically with a
//! conditional UPDATE, so two near-simultaneous sales of the last unit can
//! never both succeed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::{AppState, ListParams, PaginatedResponse};
use crate::{Result, StoreError};

const SALE_STATUSES: &[&str] = &["pagado", "parcial", "pendiente"];
const DEFAULT_SALE_STATUS: &str = "pagado";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub external_item_id: Option<Uuid>,
    pub quantity: i32,
    pub amount: Decimal,
    pub status: String,
    pub client_name: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Something sellable that is not in the catalog (commissions, one-offs).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExternalItem {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub external_item_id: Option<Uuid>,
    pub quantity: i32,
    pub amount: Decimal,
    pub status: Option<String>,
    pub client_name: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

/// Unknown statuses coerce to "pagado" rather than rejecting the sale.
fn coerce_status(status: Option<&str>) -> &str {
    match status {
        Some(s) if SALE_STATUSES.contains(&s) => s,
        _ => DEFAULT_SALE_STATUS,
    }
}

pub async fn list_sales(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Sale>>> {
    let sales = sqlx::query_as::<_, Sale>(
        "SELECT * FROM accounting_sales ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(p.per_page() as i64)
    .bind(p.offset())
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounting_sales")
        .fetch_one(&s.db)
        .await?;
    Ok(Json(PaginatedResponse {
        data: sales,
        total: total.0,
        page: p.page(),
    }))
}

pub async fn create_sale(
    State(s): State<AppState>,
    Json(r): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<Sale>)> {
    if r.quantity < 1 {
        return Err(StoreError::Invalid("quantity must be at least 1".into()));
    }
    if r.amount < Decimal::ZERO {
        return Err(StoreError::Invalid("amount cannot be negative".into()));
    }
    if r.product_id.is_none() && r.variant_id.is_none() && r.external_item_id.is_none() {
        return Err(StoreError::Invalid(
            "a sale needs a product, a variant or an external item".into(),
        ));
    }
    let status = coerce_status(r.status.as_deref());

    let mut tx = s.db.begin().await?;
    let mut sale_product_id = r.product_id;

    if let Some(variant_id) = r.variant_id {
        let row: Option<(Uuid, bool)> = sqlx::query_as(
            "SELECT v.product_id, p.is_pre_order FROM product_variants v \
             JOIN products p ON p.id = v.product_id WHERE v.id = $1",
        )
        .bind(variant_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (product_id, is_pre_order) = row.ok_or(StoreError::NotFound("variant"))?;
        sale_product_id = Some(product_id);

        if !is_pre_order {
            let decremented = sqlx::query(
                "UPDATE product_variants SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
            )
            .bind(variant_id)
            .bind(r.quantity)
            .execute(&mut *tx)
            .await?;
            if decremented.rows_affected() == 0 {
                let (available,): (i32,) =
                    sqlx::query_as("SELECT stock FROM product_variants WHERE id = $1")
                        .bind(variant_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(StoreError::InsufficientStock {
                    available,
                    requested: r.quantity,
                });
            }
        }
    } else if let Some(product_id) = r.product_id {
        let row: Option<(bool, Option<i32>)> =
            sqlx::query_as("SELECT is_pre_order, stock FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (is_pre_order, stock) = row.ok_or(StoreError::NotFound("product"))?;

        if !is_pre_order && stock.is_some() {
            let decremented = sqlx::query(
                "UPDATE products SET stock = stock - $2 \
                 WHERE id = $1 AND stock IS NOT NULL AND stock >= $2",
            )
            .bind(product_id)
            .bind(r.quantity)
            .execute(&mut *tx)
            .await?;
            if decremented.rows_affected() == 0 {
                return Err(StoreError::InsufficientStock {
                    available: stock.unwrap_or(0),
                    requested: r.quantity,
                });
            }
        }
    }

    let sale = sqlx::query_as::<_, Sale>(
        "INSERT INTO accounting_sales (id, product_id, variant_id, external_item_id, \
         quantity, amount, status, client_name, payment_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(sale_product_id)
    .bind(r.variant_id)
    .bind(r.external_item_id)
    .bind(r.quantity)
    .bind(r.amount)
    .bind(status)
    .bind(&r.client_name)
    .bind(r.payment_date)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

/// Deleting a sale does not restock: corrections are entered manually.
pub async fn remove_sale(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("DELETE FROM accounting_sales WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("sale"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExpenseRequest {
    #[validate(length(min = 1, max = 300))]
    pub description: String,
    pub amount: Decimal,
    pub expense_date: Option<DateTime<Utc>>,
}

pub async fn list_expenses(State(s): State<AppState>) -> Result<Json<Vec<Expense>>> {
    let expenses =
        sqlx::query_as::<_, Expense>("SELECT * FROM accounting_expenses ORDER BY created_at DESC")
            .fetch_all(&s.db)
            .await?;
    Ok(Json(expenses))
}

pub async fn create_expense(
    State(s): State<AppState>,
    Json(r): Json<ExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>)> {
    r.validate()?;
    if r.amount < Decimal::ZERO {
        return Err(StoreError::Invalid("amount cannot be negative".into()));
    }
    let expense = sqlx::query_as::<_, Expense>(
        "INSERT INTO accounting_expenses (id, description, amount, expense_date) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.description)
    .bind(r.amount)
    .bind(r.expense_date)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn remove_expense(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("DELETE FROM accounting_expenses WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("expense"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExternalItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

pub async fn list_external_items(State(s): State<AppState>) -> Result<Json<Vec<ExternalItem>>> {
    let items = sqlx::query_as::<_, ExternalItem>(
        "SELECT * FROM accounting_external_items ORDER BY name",
    )
    .fetch_all(&s.db)
    .await?;
    Ok(Json(items))
}

pub async fn create_external_item(
    State(s): State<AppState>,
    Json(r): Json<ExternalItemRequest>,
) -> Result<(StatusCode, Json<ExternalItem>)> {
    r.validate()?;
    let item = sqlx::query_as::<_, ExternalItem>(
        "INSERT INTO accounting_external_items (id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub products: i64,
    pub categories: i64,
    pub pending_sales: i64,
    pub total_sales: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}

pub async fn summary(State(s): State<AppState>) -> Result<Json<Summary>> {
    let (products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&s.db)
        .await?;
    let (categories,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(&s.db)
        .await?;
    let (pending_sales,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM accounting_sales WHERE status IN ('parcial', 'pendiente')",
    )
    .fetch_one(&s.db)
    .await?;
    let (total_sales,): (Decimal,) =
        sqlx::query_as("SELECT COALESCE(SUM(amount), 0) FROM accounting_sales")
            .fetch_one(&s.db)
            .await?;
    let (total_expenses,): (Decimal,) =
        sqlx::query_as("SELECT COALESCE(SUM(amount), 0) FROM accounting_expenses")
            .fetch_one(&s.db)
            .await?;

    Ok(Json(Summary {
        products,
        categories,
        pending_sales,
        total_sales,
        total_expenses,
        balance: total_sales - total_expenses,
    }))
}

/// Wipes the financial history in one transaction. Catalog and stock are
/// left untouched. Sales go first so external-item references never dangle.
pub async fn reset(State(s): State<AppState>) -> Result<StatusCode> {
    let mut tx = s.db.begin().await?;
    sqlx::query("DELETE FROM accounting_sales").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM accounting_expenses").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM accounting_external_items").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_statuses_coerce_to_pagado() {
        assert_eq!(coerce_status(Some("parcial")), "parcial");
        assert_eq!(coerce_status(Some("pendiente")), "pendiente");
        assert_eq!(coerce_status(Some("anything")), "pagado");
        assert_eq!(coerce_status(None), "pagado");
    }
}
