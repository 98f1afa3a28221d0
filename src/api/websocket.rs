//! Kitchen display WebSocket
//!
//! Pushes `nuevo_pedido` / `pedido_actualizado` as orders change and answers
//! `solicitar_pedidos` with the current list.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use super::ApiState;
use crate::events::KitchenEvent;
use crate::order::{Order, OrderStatus};

/// Outgoing messages buffered per connection
const OUTGOING_CAPACITY: usize = 32;

/// Incoming WebSocket message from a kitchen display
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KitchenIncoming {
    /// Ask for the current orders, optionally filtered by status
    SolicitarPedidos {
        #[serde(default)]
        estado: Option<OrderStatus>,
    },
    /// Ping to keep connection alive
    Ping,
}

/// Outgoing WebSocket message to a kitchen display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KitchenOutgoing {
    /// Connection established
    Conectado,
    /// An order was created
    NuevoPedido { pedido: Order },
    /// An order changed status
    PedidoActualizado { pedido: Order },
    /// Answer to `solicitar_pedidos`
    ListaPedidos { pedidos: Vec<Order> },
    /// Pong response
    Pong,
    /// Error occurred
    Error { message: String },
}

impl From<KitchenEvent> for KitchenOutgoing {
    fn from(event: KitchenEvent) -> Self {
        match event {
            KitchenEvent::NewOrder(pedido) => Self::NuevoPedido { pedido },
            KitchenEvent::OrderUpdated(pedido) => Self::PedidoActualizado { pedido },
        }
    }
}

/// Build kitchen WebSocket router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/", get(ws_upgrade)).with_state(state)
}

/// Handle WebSocket upgrade request
async fn ws_upgrade(State(state): State<Arc<ApiState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<KitchenOutgoing>(OUTGOING_CAPACITY);

    // Subscribe before announcing the connection so no order is missed
    let mut events = BroadcastStream::new(state.feed.subscribe());

    if out_tx.send(KitchenOutgoing::Conectado).await.is_err() {
        return;
    }
    tracing::info!(displays = state.feed.subscriber_count(), "kitchen display connected");

    // Single writer for the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Forward kitchen events
    let event_tx = out_tx.clone();
    let mut broadcast_task = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if event_tx.send(event.into()).await.is_err() {
                        break;
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "kitchen display lagging, events dropped");
                }
            }
        }
    });

    // Handle incoming messages
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    let reply = handle_message(&text, &state);
                    if out_tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("kitchen WebSocket closed by client");
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for any task to complete
    tokio::select! {
        _ = &mut send_task => {
            broadcast_task.abort();
            recv_task.abort();
        }
        _ = &mut broadcast_task => {
            send_task.abort();
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
            broadcast_task.abort();
        }
    }

    tracing::info!("kitchen display disconnected");
}

/// Answer a single incoming message
fn handle_message(text: &str, state: &ApiState) -> KitchenOutgoing {
    let incoming: KitchenIncoming = match serde_json::from_str(text) {
        Ok(incoming) => incoming,
        Err(e) => {
            tracing::warn!(error = %e, "invalid kitchen message");
            return KitchenOutgoing::Error {
                message: format!("mensaje invalido: {e}"),
            };
        }
    };

    match incoming {
        KitchenIncoming::Ping => KitchenOutgoing::Pong,
        KitchenIncoming::SolicitarPedidos { estado } => match state.orders.list(estado) {
            Ok(pedidos) => KitchenOutgoing::ListaPedidos { pedidos },
            Err(e) => {
                tracing::error!(error = %e, "failed to list orders for kitchen");
                KitchenOutgoing::Error {
                    message: "no se pudieron obtener los pedidos".to_string(),
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, OrderRepo};
    use crate::events::KitchenFeed;
    use crate::menu::{Catalog, Price};
    use crate::order::{OrderLine, OrderPayload};

    fn state() -> ApiState {
        let pool = db::init_memory().unwrap();
        ApiState {
            orders: OrderRepo::new(pool.clone()),
            db: pool,
            catalog: Arc::new(Catalog::default()),
            feed: KitchenFeed::new(),
        }
    }

    #[test]
    fn test_outgoing_wire_format() {
        let json = serde_json::to_value(KitchenOutgoing::Conectado).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "conectado" }));

        let json = serde_json::to_value(KitchenOutgoing::ListaPedidos { pedidos: vec![] }).unwrap();
        assert_eq!(json["type"], "lista_pedidos");
    }

    #[test]
    fn test_ping_and_bad_message() {
        let state = state();
        assert!(matches!(
            handle_message(r#"{"type":"ping"}"#, &state),
            KitchenOutgoing::Pong
        ));
        assert!(matches!(
            handle_message("not json", &state),
            KitchenOutgoing::Error { .. }
        ));
    }

    #[test]
    fn test_request_orders_with_filter() {
        let state = state();
        let order = state
            .orders
            .create(&OrderPayload {
                customer_name: "Ana".to_string(),
                items: vec![OrderLine {
                    name: "ANTICUCHOS".to_string(),
                    quantity: 1,
                    unit_price: Price::from_cents(2200),
                }],
                total: Price::from_cents(2200),
                notes: None,
            })
            .unwrap();

        let KitchenOutgoing::ListaPedidos { pedidos } =
            handle_message(r#"{"type":"solicitar_pedidos"}"#, &state)
        else {
            panic!("expected lista_pedidos");
        };
        assert_eq!(pedidos, vec![order]);

        let KitchenOutgoing::ListaPedidos { pedidos } = handle_message(
            r#"{"type":"solicitar_pedidos","estado":"completado"}"#,
            &state,
        ) else {
            panic!("expected lista_pedidos");
        };
        assert!(pedidos.is_empty());
    }
}
