//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use brasa_voice::api::ApiServerBuilder;
use brasa_voice::api::orders::CreatedResponse;
use brasa_voice::menu::default_catalog;
use brasa_voice::{Catalog, DbPool, KitchenEvent, Order, OrderStatus};
use tower::ServiceExt;

mod common;
use common::{sample_payload, setup_test_db};

/// Build a test API router over the embedded menu
fn build_test_router(db: DbPool) -> (axum::Router, brasa_voice::KitchenFeed) {
    let server = ApiServerBuilder::new(db, 0)
        .catalog(Arc::new(default_catalog()))
        .build();
    let feed = server.state().feed.clone();
    (server.router(), feed)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Create an order through the API and return it
async fn create(router: &axum::Router, customer: &str) -> Order {
    let payload = serde_json::to_value(sample_payload(customer)).unwrap();
    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/pedidos", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: CreatedResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(created.order_id, created.order.id);
    created.order
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _) = build_test_router(setup_test_db());

    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let (router, _) = build_test_router(setup_test_db());

    let response = router.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["menu"]["status"], "ok");
}

#[tokio::test]
async fn test_ready_with_empty_menu() {
    let router = ApiServerBuilder::new(setup_test_db(), 0)
        .catalog(Arc::new(Catalog::default()))
        .build()
        .router();

    let response = router.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["checks"]["menu"]["status"], "unavailable");
}

#[tokio::test]
async fn test_create_order_wire_format() {
    let (router, _) = build_test_router(setup_test_db());

    let body = serde_json::json!({
        "cliente_nombre": "Rosa",
        "detalle_pedido": [
            { "item": "1 POLLO A LA BRASA", "cantidad": 1, "precio": 53.90 },
            { "item": "PAPAS FRITAS", "cantidad": 2, "precio": 9.00 }
        ],
        "total": 71.90
    });
    let response = router
        .oneshot(json_request("POST", "/api/pedidos", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["pedidoId"].as_i64().unwrap() > 0);
    let pedido = &json["pedido"];
    assert_eq!(pedido["id"], json["pedidoId"]);
    assert_eq!(pedido["cliente_nombre"], "Rosa");
    assert_eq!(pedido["estado"], "pendiente");
    assert_eq!(pedido["detalle_pedido"][1]["cantidad"], 2);
    assert!((pedido["total"].as_f64().unwrap() - 71.90).abs() < 1e-9);
    assert!(pedido["fecha"].is_string());
}

#[tokio::test]
async fn test_create_order_recomputes_total() {
    let (router, _) = build_test_router(setup_test_db());

    let mut payload = serde_json::to_value(sample_payload("Luis")).unwrap();
    payload["total"] = serde_json::json!(1.00);

    let response = router
        .oneshot(json_request("POST", "/api/pedidos", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!((json["pedido"]["total"].as_f64().unwrap() - 44.00).abs() < 1e-9);
}

#[tokio::test]
async fn test_create_invalid_order() {
    let (router, _) = build_test_router(setup_test_db());

    // No lines
    let body = serde_json::json!({
        "cliente_nombre": "Rosa",
        "detalle_pedido": [],
        "total": 0
    });
    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/pedidos", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("al menos un item"));

    // Missing customer name
    let body = serde_json::json!({
        "cliente_nombre": "  ",
        "detalle_pedido": [{ "item": "ANTICUCHOS", "cantidad": 1, "precio": 22.0 }],
        "total": 22.0
    });
    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/pedidos", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Not JSON at all
    let request = Request::builder()
        .method("POST")
        .uri("/api/pedidos")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_list_orders_newest_first_with_filter() {
    let (router, _) = build_test_router(setup_test_db());

    let first = create(&router, "Ana").await;
    let second = create(&router, "Beto").await;

    let response = router.clone().oneshot(get("/api/pedidos")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(
        orders.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    // Move the first order along and filter by status
    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/pedidos/{}/estado", first.id),
            &serde_json::json!({ "estado": "en-proceso" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(get("/api/pedidos?estado=en-proceso"))
        .await
        .unwrap();
    let orders: Vec<Order> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, first.id);
    assert_eq!(orders[0].status, OrderStatus::InProgress);

    // Empty filter means all orders
    let response = router
        .clone()
        .oneshot(get("/api/pedidos?estado="))
        .await
        .unwrap();
    let orders: Vec<Order> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(orders.len(), 2);

    let response = router
        .oneshot(get("/api/pedidos?estado=listo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_order() {
    let (router, _) = build_test_router(setup_test_db());
    let order = create(&router, "Carla").await;

    let response = router
        .clone()
        .oneshot(get(&format!("/api/pedidos/{}", order.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Order = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(fetched, order);

    let response = router.oneshot(get("/api/pedidos/9999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn test_update_status_errors() {
    let (router, _) = build_test_router(setup_test_db());
    let order = create(&router, "Diego").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/pedidos/{}/estado", order.id),
            &serde_json::json!({ "estado": "listo" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(json_request(
            "PUT",
            "/api/pedidos/9999/estado",
            &serde_json::json!({ "estado": "completado" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_kitchen_feed_sees_changes() {
    let (router, feed) = build_test_router(setup_test_db());
    let mut events = feed.subscribe();

    let order = create(&router, "Elena").await;
    match events.recv().await.unwrap() {
        KitchenEvent::NewOrder(created) => assert_eq!(created, order),
        other => panic!("expected new order, got {other:?}"),
    }

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/api/pedidos/{}/estado", order.id),
            &serde_json::json!({ "estado": "completado" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    match events.recv().await.unwrap() {
        KitchenEvent::OrderUpdated(updated) => {
            assert_eq!(updated.id, order.id);
            assert_eq!(updated.status, OrderStatus::Completed);
        }
        other => panic!("expected order update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_menu_endpoint() {
    let (router, _) = build_test_router(setup_test_db());

    let response = router.oneshot(get("/api/menu")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let catalog: Catalog = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(catalog, default_catalog());
}
