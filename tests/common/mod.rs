//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use brasa_voice::menu::default_catalog;
use brasa_voice::order::OrderLine;
use brasa_voice::{
    Controller, DbPool, DialogueConfig, OrderPayload, OrderSubmitter, Price, SubmitOutcome, db,
};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Controller over the embedded Brasa Roja menu
#[must_use]
pub fn brasa_controller() -> Controller {
    Controller::new(Arc::new(default_catalog()), DialogueConfig::default())
}

/// A valid order payload with one line
#[must_use]
pub fn sample_payload(customer: &str) -> OrderPayload {
    OrderPayload {
        customer_name: customer.to_string(),
        items: vec![OrderLine {
            name: "ANTICUCHOS".to_string(),
            quantity: 2,
            unit_price: Price::from_cents(2200),
        }],
        total: Price::from_cents(4400),
        notes: None,
    }
}

/// Submitter that records payloads and answers with a fixed outcome
#[derive(Clone)]
pub struct RecordingSubmitter {
    submitted: Arc<Mutex<Vec<OrderPayload>>>,
    outcome: SubmitOutcome,
}

impl RecordingSubmitter {
    /// Accept every order with this id
    #[must_use]
    pub fn accepting(order_id: i64) -> Self {
        Self::answering(SubmitOutcome::Accepted(order_id))
    }

    /// Answer every order with `outcome`
    #[must_use]
    pub fn answering(outcome: SubmitOutcome) -> Self {
        Self {
            submitted: Arc::new(Mutex::new(Vec::new())),
            outcome,
        }
    }

    /// Payloads received so far
    #[must_use]
    pub fn submitted(&self) -> Vec<OrderPayload> {
        self.submitted.lock().expect("submitter lock").clone()
    }
}

#[async_trait]
impl OrderSubmitter for RecordingSubmitter {
    async fn submit(&self, payload: &OrderPayload) -> SubmitOutcome {
        self.submitted
            .lock()
            .expect("submitter lock")
            .push(payload.clone());
        self.outcome.clone()
    }
}
