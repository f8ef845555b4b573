// Order Snapshot Provider Port (Interface)

use crate::domain::{OrderId, OrderSnapshot};
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to the externally-owned order store.
///
/// Returns an immutable snapshot of an order's metadata and line items at a
/// point in time. The core never writes through this port.
#[async_trait]
pub trait OrderSnapshotProvider: Send + Sync {
    /// Fetch the snapshot for an order, `NotFound` if the order is unknown.
    async fn fetch(&self, order_id: OrderId) -> Result<OrderSnapshot>;
}
