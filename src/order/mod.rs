//! Orders: submission payload, backend record and the submitter seam
//!
//! Field names on the wire are the ones the kitchen display has always used
//! (`cliente_nombre`, `detalle_pedido`, `estado`, ...).

mod client;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::menu::Price;
use crate::{Error, Result};

pub use client::HttpOrderClient;

/// One line of an order as sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "item")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precio")]
    pub unit_price: Price,
}

/// Body of `POST /api/pedidos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(rename = "cliente_nombre")]
    pub customer_name: String,
    #[serde(rename = "detalle_pedido")]
    pub items: Vec<OrderLine>,
    pub total: Price,
    #[serde(rename = "notas", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderPayload {
    /// Build a payload from the session cart
    #[must_use]
    pub fn from_cart(customer_name: &str, cart: &Cart) -> Self {
        let items = cart
            .lines()
            .iter()
            .map(|line| OrderLine {
                name: line.item_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Self {
            customer_name: customer_name.to_string(),
            items,
            total: cart.total(),
            notes: None,
        }
    }

    /// Check the payload before storing it
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty customer name, no lines, or a zero quantity
    pub fn validate(&self) -> Result<()> {
        if self.customer_name.trim().is_empty() {
            return Err(Error::InvalidInput("cliente_nombre es obligatorio".to_string()));
        }
        if self.items.is_empty() {
            return Err(Error::InvalidInput(
                "el pedido debe tener al menos un item".to_string(),
            ));
        }
        if let Some(line) = self.items.iter().find(|l| l.quantity == 0) {
            return Err(Error::InvalidInput(format!(
                "cantidad invalida para {}",
                line.name
            )));
        }
        Ok(())
    }

    /// Sum of the lines, which is what the store records as the total
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.items.iter().map(|l| l.unit_price.times(l.quantity)).sum()
    }
}

/// Kitchen workflow status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en-proceso")]
    InProgress,
    #[serde(rename = "completado")]
    Completed,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::InProgress => "en-proceso",
            Self::Completed => "completado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "en-proceso" => Ok(Self::InProgress),
            "completado" => Ok(Self::Completed),
            other => Err(Error::InvalidInput(format!("estado desconocido: {other}"))),
        }
    }
}

/// A stored order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "cliente_nombre")]
    pub customer_name: String,
    #[serde(rename = "detalle_pedido")]
    pub items: Vec<OrderLine>,
    pub total: Price,
    #[serde(rename = "notas", default)]
    pub notes: Option<String>,
    #[serde(rename = "estado")]
    pub status: OrderStatus,
    #[serde(rename = "fecha")]
    pub created_at: DateTime<Utc>,
}

/// What happened to a submitted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stored by the backend under this id
    Accepted(i64),
    /// The backend answered with an error message
    Rejected(String),
    /// The backend could not be reached
    Unreachable(String),
}

/// Hands a confirmed order to the kitchen
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit an order; failures are reported in the outcome
    async fn submit(&self, payload: &OrderPayload) -> SubmitOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuItem;

    fn item(name: &str, cents: u64) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            category: "brasa".to_string(),
            unit_price: Price::from_cents(cents),
            aliases: Vec::new(),
        }
    }

    #[test]
    fn test_payload_from_cart() {
        let mut cart = Cart::new();
        cart.add(&item("1 POLLO A LA BRASA", 5390), 1);
        cart.add(&item("PAPAS FRITAS", 900), 2);

        let payload = OrderPayload::from_cart("Ana", &cart);
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.total, Price::from_cents(7190));
        assert_eq!(payload.line_total(), payload.total);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["cliente_nombre"], "Ana");
        assert_eq!(json["total"], 71.9);
        assert_eq!(json["detalle_pedido"][1]["item"], "PAPAS FRITAS");
        assert_eq!(json["detalle_pedido"][1]["cantidad"], 2);
        assert_eq!(json["detalle_pedido"][1]["precio"], 9.0);
        assert!(json.get("notas").is_none());
    }

    #[test]
    fn test_validate() {
        let mut payload = OrderPayload {
            customer_name: "Ana".to_string(),
            items: vec![OrderLine {
                name: "ANTICUCHOS".to_string(),
                quantity: 1,
                unit_price: Price::from_cents(2200),
            }],
            total: Price::from_cents(2200),
            notes: None,
        };
        assert!(payload.validate().is_ok());

        payload.items[0].quantity = 0;
        assert!(matches!(payload.validate(), Err(Error::InvalidInput(_))));

        payload.items.clear();
        assert!(payload.validate().is_err());

        payload.customer_name = "  ".to_string();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"en-proceso\""
        );
        assert_eq!("completado".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
        assert!("listo".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::default().to_string(), "pendiente");
    }
}
