//! PostgREST data client for the `orders`, `products`, and `baristas` tables.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;

use cortado_core::{OrderId, OrderStatus, ProductCategory, ProductId, UserId};

use super::{SupabaseError, error_message};
use crate::config::SupabaseConfig;
use crate::models::{NewOrderRow, NewProductRequest, Order, OrderItem, Product, ProductPatch};
use crate::services::slots::CategoryMap;

/// Filter for catalog listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    /// Hide `is_active = false` entries (everyone but baristas).
    pub only_active: bool,
    /// Restrict to a single category.
    pub category: Option<ProductCategory>,
}

/// The two columns slot counting needs from each order in a pickup window.
///
/// Both are nullable in the table, so counting falls back to defaults.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SlotOrder {
    #[serde(default)]
    pub total_items: Option<u32>,
    #[serde(default)]
    pub order_items: Option<Vec<OrderItem>>,
}

/// Client for the PostgREST row API.
///
/// Uses the service-role key, so row-level security is bypassed; every
/// owner/role check happens in the route handlers.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    endpoint: String,
    service_role_key: String,
}

impl StoreClient {
    /// Create a new PostgREST client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(StoreClientInner {
                client: reqwest::Client::new(),
                endpoint: format!("{}/rest/v1", config.url),
                service_role_key: config.service_role_key.expose_secret().to_string(),
            }),
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The orders whose pickup time falls in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn orders_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SlotOrder>, SupabaseError> {
        self.select("orders", &window_query(start, end)).await
    }

    /// Insert a new order and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    #[instrument(skip(self, row))]
    pub async fn insert_order(&self, row: &NewOrderRow) -> Result<Order, SupabaseError> {
        self.insert_returning("orders", row, "order").await
    }

    /// Orders matching an explicit id set, newest-created-first.
    ///
    /// With `owner` set, rows belonging to other users are filtered out.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn orders_by_ids(
        &self,
        ids: &[OrderId],
        owner: Option<UserId>,
    ) -> Result<Vec<Order>, SupabaseError> {
        self.select("orders", &ids_query(ids, owner)).await
    }

    /// The soonest `limit` orders by ascending pickup time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn upcoming_orders(
        &self,
        owner: Option<UserId>,
        limit: u32,
    ) -> Result<Vec<Order>, SupabaseError> {
        self.select("orders", &upcoming_query(owner, limit)).await
    }

    /// Overwrite an order's status and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no order has this id.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Order, SupabaseError> {
        self.update_returning(
            "orders",
            &[("id".to_owned(), format!("eq.{id}"))],
            &json!({ "status": status }),
            "order",
        )
        .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Catalog entries, newest-created-first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, SupabaseError> {
        self.select("products", &product_query(filter)).await
    }

    /// Name-to-category mapping over the whole catalog, for slot counting.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn product_category_map(&self) -> Result<CategoryMap, SupabaseError> {
        #[derive(serde::Deserialize)]
        struct CategoryRow {
            name: String,
            category: ProductCategory,
        }

        let rows: Vec<CategoryRow> = self
            .select(
                "products",
                &[("select".to_owned(), "name,category".to_owned())],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.name, row.category))
            .collect())
    }

    /// Insert a catalog entry and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn insert_product(
        &self,
        product: &NewProductRequest,
    ) -> Result<Product, SupabaseError> {
        self.insert_returning("products", product, "product").await
    }

    /// Apply a partial update and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no product has this id.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, SupabaseError> {
        self.update_returning(
            "products",
            &[("id".to_owned(), format!("eq.{id}"))],
            patch,
            "product",
        )
        .await
    }

    /// Delete a catalog entry. Deleting an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::DELETE, "products")
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::expect_success(response).await
    }

    // =========================================================================
    // Baristas
    // =========================================================================

    /// Whether an email (already lowercased) is in the persisted barista list.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn barista_exists(&self, email: &str) -> Result<bool, SupabaseError> {
        #[derive(serde::Deserialize)]
        struct BaristaRow {
            #[allow(dead_code)]
            email: String,
        }

        let rows: Vec<BaristaRow> = self
            .select(
                "baristas",
                &[
                    ("select".to_owned(), "email".to_owned()),
                    ("email".to_owned(), format!("eq.{email}")),
                ],
            )
            .await?;

        Ok(!rows.is_empty())
    }

    /// Add an email (already lowercased) to the persisted barista list.
    /// Idempotent: re-adding an existing email succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    #[instrument(skip(self))]
    pub async fn upsert_barista(&self, email: &str) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::POST, "baristas")
            .query(&[("on_conflict", "email")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!({ "email": email }))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, format!("{}/{table}", self.inner.endpoint))
            .header("apikey", &self.inner.service_role_key)
            .bearer_auth(&self.inner.service_role_key)
    }

    /// GET a filtered row set.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>, SupabaseError> {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// POST a row with `return=representation`, expecting the row back.
    async fn insert_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        body: &impl serde::Serialize,
        entity: &str,
    ) -> Result<T, SupabaseError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(body)
            .send()
            .await?;
        Self::read_single(response, entity).await
    }

    /// PATCH filtered rows with `return=representation`, expecting exactly
    /// one row back.
    async fn update_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
        body: &impl serde::Serialize,
        entity: &str,
    ) -> Result<T, SupabaseError> {
        let response = self
            .request(Method::PATCH, table)
            .query(query)
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(body)
            .send()
            .await?;
        Self::read_single(response, entity).await
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Like [`Self::read_json`], but a zero-row single-object response
    /// (PostgREST answers 406) becomes `NotFound` instead of an API error.
    async fn read_single<T: DeserializeOwned>(
        response: reqwest::Response,
        entity: &str,
    ) -> Result<T, SupabaseError> {
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Err(SupabaseError::NotFound(entity.to_owned()));
        }
        Self::read_json(response).await
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), SupabaseError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Query construction
// =============================================================================

/// Timestamps in filters use millisecond precision, the same shape the
/// mobile app submits.
fn pg_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn window_query(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<(String, String)> {
    vec![
        ("select".to_owned(), "total_items,order_items".to_owned()),
        ("pickup_time".to_owned(), format!("gte.{}", pg_timestamp(start))),
        ("pickup_time".to_owned(), format!("lt.{}", pg_timestamp(end))),
    ]
}

fn ids_query(ids: &[OrderId], owner: Option<UserId>) -> Vec<(String, String)> {
    let list = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let mut query = vec![
        ("select".to_owned(), "*".to_owned()),
        ("id".to_owned(), format!("in.({list})")),
    ];
    if let Some(owner) = owner {
        query.push(("user_id".to_owned(), format!("eq.{owner}")));
    }
    query.push(("order".to_owned(), "created_at.desc".to_owned()));
    query
}

fn upcoming_query(owner: Option<UserId>, limit: u32) -> Vec<(String, String)> {
    let mut query = vec![("select".to_owned(), "*".to_owned())];
    if let Some(owner) = owner {
        query.push(("user_id".to_owned(), format!("eq.{owner}")));
    }
    query.push(("order".to_owned(), "pickup_time.asc".to_owned()));
    query.push(("limit".to_owned(), limit.to_string()));
    query
}

fn product_query(filter: &ProductFilter) -> Vec<(String, String)> {
    let mut query = vec![("select".to_owned(), "*".to_owned())];
    if filter.only_active {
        query.push(("is_active".to_owned(), "eq.true".to_owned()));
    }
    if let Some(category) = filter.category {
        query.push(("category".to_owned(), format!("eq.{category}")));
    }
    query.push(("order".to_owned(), "created_at.desc".to_owned()));
    query
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_owned(), value.to_owned())
    }

    #[test]
    fn test_pg_timestamp_matches_iso_millis() {
        let t = DateTime::parse_from_rfc3339("2026-08-07T10:15:30.123Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(pg_timestamp(t), "2026-08-07T10:15:30.123Z");
    }

    #[test]
    fn test_window_query_is_half_open() {
        let start = DateTime::parse_from_rfc3339("2026-08-07T10:10:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let end = DateTime::parse_from_rfc3339("2026-08-07T10:20:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(
            window_query(start, end),
            vec![
                pair("select", "total_items,order_items"),
                pair("pickup_time", "gte.2026-08-07T10:10:00.000Z"),
                pair("pickup_time", "lt.2026-08-07T10:20:00.000Z"),
            ]
        );
    }

    #[test]
    fn test_ids_query_scopes_to_owner() {
        let a: OrderId = "0f0e0d0c-0b0a-4900-8807-060504030201".parse().unwrap();
        let owner: UserId = "11111111-2222-4333-8444-555555555555".parse().unwrap();

        let query = ids_query(&[a], Some(owner));
        assert_eq!(
            query,
            vec![
                pair("select", "*"),
                pair("id", "in.(0f0e0d0c-0b0a-4900-8807-060504030201)"),
                pair("user_id", "eq.11111111-2222-4333-8444-555555555555"),
                pair("order", "created_at.desc"),
            ]
        );
    }

    #[test]
    fn test_ids_query_unscoped_for_baristas() {
        let a: OrderId = "0f0e0d0c-0b0a-4900-8807-060504030201".parse().unwrap();
        let query = ids_query(&[a], None);
        assert!(!query.iter().any(|(key, _)| key == "user_id"));
    }

    #[test]
    fn test_upcoming_query_orders_by_pickup_time() {
        let query = upcoming_query(None, 50);
        assert_eq!(
            query,
            vec![
                pair("select", "*"),
                pair("order", "pickup_time.asc"),
                pair("limit", "50"),
            ]
        );
    }

    #[test]
    fn test_product_query_for_anonymous_callers() {
        let query = product_query(&ProductFilter {
            only_active: true,
            category: Some(ProductCategory::Dessert),
        });
        assert_eq!(
            query,
            vec![
                pair("select", "*"),
                pair("is_active", "eq.true"),
                pair("category", "eq.dessert"),
                pair("order", "created_at.desc"),
            ]
        );
    }

    #[test]
    fn test_product_query_for_baristas_includes_inactive() {
        let query = product_query(&ProductFilter::default());
        assert!(!query.iter().any(|(key, _)| key == "is_active"));
    }
}
