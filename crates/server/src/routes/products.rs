//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use cortado_core::{ProductCategory, ProductId};

use crate::error::{AppError, AppJson, Result};
use crate::middleware::{OptionalAuth, RequireBarista};
use crate::models::{NewProductRequest, Product, ProductPatch};
use crate::state::AppState;
use crate::supabase::ProductFilter;

/// Query parameters for `GET /products`.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Response body for `DELETE /products/{id}`.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
}

/// List the catalog. Anonymous callers and customers see only active
/// entries; baristas also see inactive ones.
///
/// Unknown `category` values are ignored rather than rejected, matching
/// what the apps have always sent.
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Product>>> {
    let is_barista = caller.is_some_and(|c| c.is_barista);
    let category = query
        .category
        .as_deref()
        .and_then(|raw| raw.parse::<ProductCategory>().ok());

    let products = state
        .store()
        .products(&ProductFilter {
            only_active: !is_barista,
            category,
        })
        .await?;

    Ok(Json(products))
}

/// Create a catalog entry.
pub async fn create(
    State(state): State<AppState>,
    RequireBarista(_caller): RequireBarista,
    AppJson(payload): AppJson<NewProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    payload.validate().map_err(AppError::Validation)?;
    let product = state.store().insert_product(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a catalog entry.
pub async fn update(
    State(state): State<AppState>,
    RequireBarista(_caller): RequireBarista,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ProductPatch>,
) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    payload.validate().map_err(AppError::Validation)?;
    let product = state.store().update_product(id, &payload).await?;
    Ok(Json(product))
}

/// Delete a catalog entry.
pub async fn destroy(
    State(state): State<AppState>,
    RequireBarista(_caller): RequireBarista,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let id = parse_product_id(&id)?;
    state.store().delete_product(id).await?;
    Ok(Json(DeletedResponse { ok: true }))
}

fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Invalid product id: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_id() {
        assert!(parse_product_id("aa6b4f7b-1c2d-4e5f-8a9b-0c1d2e3f4a5b").is_ok());
        assert!(matches!(
            parse_product_id("croissant"),
            Err(AppError::Validation(_))
        ));
    }
}
