//! Order endpoints
//!
//! Every change is published to the kitchen feed after it is stored.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::Error;
use crate::events::KitchenEvent;
use crate::order::{Order, OrderPayload, OrderStatus};

/// Response to a created order
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    #[serde(rename = "pedidoId")]
    pub order_id: i64,
    #[serde(rename = "pedido")]
    pub order: Order,
}

/// Query string for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub estado: Option<String>,
}

/// Body of a status update
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub estado: String,
}

/// Store a new order
async fn create_order(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| Error::InvalidInput(e.body_text()))?;

    let order = state.orders.create(&payload)?;
    tracing::info!(
        order_id = order.id,
        customer = %order.customer_name,
        total = %order.total,
        "order created"
    );

    state.feed.publish(KitchenEvent::NewOrder(order.clone()));

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            order_id: order.id,
            order,
        }),
    ))
}

/// List orders, newest first
async fn list_orders(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let status = parse_status(query.estado.as_deref())?;
    let orders = state.orders.list(status)?;
    Ok(Json(orders))
}

/// Get one order
async fn get_order(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .orders
        .find(id)?
        .ok_or_else(|| Error::NotFound(format!("pedido {id} no encontrado")))?;
    Ok(Json(order))
}

/// Move an order through the kitchen workflow
async fn update_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let Json(body) = body.map_err(|e| Error::InvalidInput(e.body_text()))?;
    let status: OrderStatus = body.estado.parse()?;

    let order = state
        .orders
        .update_status(id, status)?
        .ok_or_else(|| Error::NotFound(format!("pedido {id} no encontrado")))?;
    tracing::info!(order_id = id, status = %status, "order status updated");

    state.feed.publish(KitchenEvent::OrderUpdated(order.clone()));
    Ok(Json(order))
}

/// Parse an optional `estado` filter, treating an empty value as no filter
fn parse_status(raw: Option<&str>) -> crate::Result<Option<OrderStatus>> {
    raw.filter(|s| !s.is_empty())
        .map(str::parse)
        .transpose()
}

/// Build order router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", get(get_order))
        .route("/{id}/estado", put(update_status))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("")).unwrap(), None);
        assert_eq!(
            parse_status(Some("en-proceso")).unwrap(),
            Some(OrderStatus::InProgress)
        );
        assert!(matches!(
            parse_status(Some("listo")),
            Err(Error::InvalidInput(_))
        ));
    }
}
