//! Order route handlers: creation behind slot admission, listing, triage.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use cortado_core::{OrderId, OrderStatus};

use crate::error::{AppError, AppJson, Result};
use crate::middleware::{RequireAuth, RequireBarista};
use crate::models::{CreateOrderRequest, NewOrderRow, Order, parse_pickup_time};
use crate::services::slots::{
    CategoryMap, SlotAvailability, SlotBounds, check_capacity, coffee_item_count,
};
use crate::state::AppState;

/// Query parameters for `GET /orders`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub ids: Option<String>,
}

/// Query parameters for `GET /orders/slot-availability`.
#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub pickup_time: Option<String>,
}

/// Body for `PATCH /orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Create an order in the caller's name, admitting it into its pickup
/// window first.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = payload.validate().map_err(AppError::Validation)?;

    let bounds = SlotBounds::containing(order.pickup_time);
    let categories = load_categories(&state).await;
    let load = window_load(&state, bounds, &categories).await?;
    let incoming = coffee_item_count(&order.order_items, order.total_items, &categories);
    check_capacity(load, incoming)?;

    // Not atomic with the read above: a concurrent creation targeting the
    // same window can slip in between and overshoot the cap.
    let stored = state
        .store()
        .insert_order(&NewOrderRow::new(order, caller.user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// List orders. Non-baristas only ever see their own.
///
/// With `ids`, returns the matching set newest-created-first; without,
/// the soonest 50 by pickup time.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    let owner = (!caller.is_barista).then_some(caller.user_id);

    let ids = match query.ids.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_ids(raw)?,
        _ => Vec::new(),
    };

    let orders = if ids.is_empty() {
        state.store().upcoming_orders(owner, 50).await?
    } else {
        state.store().orders_by_ids(&ids, owner).await?
    };

    Ok(Json(orders))
}

/// Overwrite an order's status. Barista only; any non-empty status string
/// is stored verbatim.
pub async fn update_status(
    State(state): State<AppState>,
    RequireBarista(_caller): RequireBarista,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let id: OrderId = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid order id: {id}")))?;
    let status = OrderStatus::parse(&payload.status)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let order = state.store().update_order_status(id, &status).await?;
    Ok(Json(order))
}

/// Advisory remaining capacity for the window containing `pickup_time`.
/// Public, and stale the moment it is produced.
pub async fn slot_availability(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<SlotAvailability>> {
    let pickup = parse_pickup_time(query.pickup_time.as_deref().unwrap_or_default())
        .map_err(AppError::Validation)?;

    let bounds = SlotBounds::containing(pickup);
    let categories = load_categories(&state).await;
    let load = window_load(&state, bounds, &categories).await?;

    Ok(Json(SlotAvailability::for_load(bounds, load)))
}

// =============================================================================
// Helpers
// =============================================================================

/// Load the catalog's name-to-category mapping.
///
/// A failed load degrades to an empty map, which counts every item toward
/// the cap - stricter admission rather than a failed order.
async fn load_categories(state: &AppState) -> CategoryMap {
    match state.store().product_category_map().await {
        Ok(map) => map,
        Err(error) => {
            tracing::warn!(
                %error,
                "failed to load product categories, counting every item toward the slot cap"
            );
            CategoryMap::default()
        }
    }
}

/// Sum the coffee items of every order already in the window.
async fn window_load(
    state: &AppState,
    bounds: SlotBounds,
    categories: &CategoryMap,
) -> Result<u32> {
    let orders = state
        .store()
        .orders_in_window(bounds.start, bounds.end)
        .await?;

    Ok(orders
        .iter()
        .map(|order| {
            coffee_item_count(
                order.order_items.as_deref().unwrap_or(&[]),
                order.total_items.unwrap_or(1),
                categories,
            )
        })
        .sum())
}

/// Parse the comma-separated `ids` filter.
fn parse_ids(raw: &str) -> Result<Vec<OrderId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<OrderId>()
                .map_err(|_| AppError::Validation(format!("Invalid order id: {part}")))
        })
        .collect()
}
