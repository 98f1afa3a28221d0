//! Per-customer dialogue state

use uuid::Uuid;

use super::DialogueState;
use crate::cart::Cart;

/// One customer interaction
///
/// Owned by the caller and passed into every controller call.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub cart: Cart,
    pub state: DialogueState,
    /// Consecutive utterances that could not be interpreted
    pub misses: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, "session created");
        Self {
            id,
            customer_name: None,
            cart: Cart::new(),
            state: DialogueState::AwaitingName,
            misses: 0,
        }
    }

    /// Name used on the order ticket
    #[must_use]
    pub fn ticket_name(&self) -> &str {
        self.customer_name.as_deref().unwrap_or("Cliente")
    }
}
