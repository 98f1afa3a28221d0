//! HTTP client for the order backend

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Order, OrderPayload, OrderStatus, OrderSubmitter, SubmitOutcome};
use crate::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct CreatedResponse {
    #[serde(rename = "pedidoId")]
    order_id: i64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Talks to `/api/pedidos` on the order backend
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderClient {
    /// Create a client for the backend at `base_url` (e.g. `http://localhost:3000`)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/api/pedidos", self.base_url)
    }

    /// List orders, newest first, optionally filtered by status
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend answers with an error
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let mut request = self.client.get(self.orders_url());
        if let Some(status) = status {
            request = request.query(&[("estado", status.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(Error::Order(format!("backend error {status}: {message}")));
        }

        Ok(response.json().await?)
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        })
}

#[async_trait]
impl OrderSubmitter for HttpOrderClient {
    async fn submit(&self, payload: &OrderPayload) -> SubmitOutcome {
        tracing::debug!(
            customer = %payload.customer_name,
            lines = payload.items.len(),
            total = %payload.total,
            "submitting order"
        );

        let response = match self.client.post(self.orders_url()).json(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "order backend unreachable");
                return SubmitOutcome::Unreachable(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            tracing::warn!(status = %status, message = %message, "order rejected");
            return SubmitOutcome::Rejected(message);
        }

        match response.json::<CreatedResponse>().await {
            Ok(created) => {
                tracing::info!(order_id = created.order_id, "order accepted");
                SubmitOutcome::Accepted(created.order_id)
            }
            Err(e) => {
                tracing::error!(error = %e, "unexpected order backend response");
                SubmitOutcome::Rejected(format!("respuesta inesperada del servidor: {e}"))
            }
        }
    }
}
