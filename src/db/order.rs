//! Order repository

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::DbPool;
use crate::menu::Price;
use crate::order::{Order, OrderLine, OrderPayload, OrderStatus};
use crate::{Error, Result};

const SELECT_ORDER: &str =
    "SELECT id, customer_name, items, total_cents, notes, status, created_at FROM orders";

/// Order repository
#[derive(Clone)]
pub struct OrderRepo {
    pool: DbPool,
}

impl OrderRepo {
    /// Create a new order repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store a new order with status `pendiente`
    ///
    /// The stored total is recomputed from the lines.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the payload is invalid, or error if the insert fails
    pub fn create(&self, payload: &OrderPayload) -> Result<Order> {
        payload.validate()?;

        let total = payload.line_total();
        if total != payload.total {
            tracing::warn!(
                sent = %payload.total,
                computed = %total,
                "order total does not match its lines, storing computed total"
            );
        }

        let items = serde_json::to_string(&payload.items)?;
        let created_at = Utc::now();
        let status = OrderStatus::Pending;

        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO orders (customer_name, items, total_cents, notes, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                payload.customer_name.trim(),
                items,
                cents_to_sql(total)?,
                payload.notes,
                status.as_str(),
                created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(order_id = id, "order row inserted");

        Ok(Order {
            id,
            customer_name: payload.customer_name.trim().to_string(),
            items: payload.items.clone(),
            total,
            notes: payload.notes.clone(),
            status,
            created_at,
        })
    }

    /// Find an order by id
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, id: i64) -> Result<Option<Order>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let row = conn
            .query_row(&format!("{SELECT_ORDER} WHERE id = ?1"), [id], read_row)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        row.map(OrderRow::into_order).transpose()
    }

    /// List orders, newest first, optionally filtered by status
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let (sql, filter) = match status {
            Some(status) => (
                format!("{SELECT_ORDER} WHERE status = ?1 ORDER BY id DESC"),
                vec![status.as_str()],
            ),
            None => (format!("{SELECT_ORDER} ORDER BY id DESC"), Vec::new()),
        };

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows: Vec<OrderRow> = stmt
            .query_map(rusqlite::params_from_iter(filter), read_row)
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Change the status of an order
    ///
    /// Returns the updated order, or `None` if no order has this id.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn update_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        let updated = {
            let conn = self
                .pool
                .get()
                .map_err(|e| Error::Database(e.to_string()))?;
            conn.execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id],
            )
            .map_err(|e| Error::Database(e.to_string()))?
        };

        if updated == 0 {
            return Ok(None);
        }

        tracing::debug!(order_id = id, "order row updated");
        self.find(id)
    }
}

/// Raw column values, decoded outside the rusqlite closure
struct OrderRow {
    id: i64,
    customer_name: String,
    items: String,
    total_cents: i64,
    notes: Option<String>,
    status: String,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<OrderRow> {
    Ok(OrderRow {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        items: row.get(2)?,
        total_cents: row.get(3)?,
        notes: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl OrderRow {
    fn into_order(self) -> Result<Order> {
        let items: Vec<OrderLine> = serde_json::from_str(&self.items)?;
        let total_cents = u64::try_from(self.total_cents)
            .map_err(|_| Error::Database(format!("negative total in order {}", self.id)))?;

        Ok(Order {
            id: self.id,
            customer_name: self.customer_name,
            items,
            total: Price::from_cents(total_cents),
            notes: self.notes,
            status: self.status.parse()?,
            created_at: parse_datetime(&self.created_at),
        })
    }
}

fn cents_to_sql(price: Price) -> Result<i64> {
    i64::try_from(price.cents()).map_err(|_| Error::InvalidInput(format!("total too large: {price}")))
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
