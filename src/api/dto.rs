//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                 | Description                               | Key Methods         |
// |----------------------|-------------------------------------------|---------------------|
// | OrderAck             | Acknowledgement for an accepted order     | accepted            |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::types::Order;

/// Acknowledgement returned when an order enters the book. The incoming wire
/// shape is [`crate::types::OrderDraft`]; the book view and match result
/// serialize directly from their domain types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    /// Always `"added"` for a successful submission.
    pub status: String,
    /// The order as inserted, including its assigned timestamp.
    pub order: Order,
}

impl OrderAck {
    /// Wraps an inserted order.
    pub fn accepted(order: Order) -> Self {
        Self {
            status: "added".to_string(),
            order,
        }
    }
}
