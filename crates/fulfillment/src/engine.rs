use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use warehouse_core::OrderId;
use warehouse_inventory::{InventoryLedger, StockShortfall};

use crate::order::{Order, UnfulfilledOrder};

/// Result of one processing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The pending queue was empty; nothing changed.
    Idle,
    Fulfilled { order_id: OrderId },
    Unfulfilled {
        order_id: OrderId,
        reason: StockShortfall,
    },
}

impl ProcessOutcome {
    pub fn is_idle(&self) -> bool {
        matches!(self, ProcessOutcome::Idle)
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            ProcessOutcome::Idle => None,
            ProcessOutcome::Fulfilled { order_id } => Some(order_id),
            ProcessOutcome::Unfulfilled { order_id, .. } => Some(order_id),
        }
    }
}

/// Serializable copy of the three order containers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersSnapshot {
    #[serde(rename = "order_queue", default)]
    pub pending: Vec<Order>,
    #[serde(rename = "fulfilled_orders", default)]
    pub fulfilled: Vec<Order>,
    #[serde(rename = "unfulfilled_orders", default)]
    pub unfulfilled: Vec<UnfulfilledOrder>,
}

/// FIFO order queue plus the two terminal lists.
///
/// Every submitted order lives in exactly one of `pending`, `fulfilled` or
/// `unfulfilled`. Resolved orders never go back to `pending`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulfillmentEngine {
    pending: VecDeque<Order>,
    fulfilled: Vec<Order>,
    unfulfilled: Vec<UnfulfilledOrder>,
}

impl FulfillmentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an order at the tail. Duplicate order ids are accepted.
    pub fn submit(&mut self, order: Order) {
        tracing::debug!(
            order_id = %order.id(),
            lines = order.lines().len(),
            queued = self.pending.len() + 1,
            "order submitted"
        );
        self.pending.push_back(order);
    }

    /// Resolve the order at the head of the queue.
    ///
    /// Validate-then-commit: every line is checked in insertion order,
    /// stopping at the first missing SKU or shortfall. Only when all lines
    /// pass is stock decremented, in the same order. A failed order leaves
    /// the ledger untouched.
    pub fn process_next(&mut self, ledger: &mut InventoryLedger) -> ProcessOutcome {
        let Some(order) = self.pending.pop_front() else {
            tracing::debug!("no pending orders to process");
            return ProcessOutcome::Idle;
        };

        match ledger.withdraw_all(order.requested()) {
            Ok(()) => {
                tracing::info!(order_id = %order.id(), items = %order.items_summary(), "order fulfilled");
                let order_id = order.id().clone();
                self.fulfilled.push(order);
                ProcessOutcome::Fulfilled { order_id }
            }
            Err(reason) => {
                tracing::warn!(order_id = %order.id(), %reason, "order could not be fulfilled");
                let order_id = order.id().clone();
                self.unfulfilled.push(UnfulfilledOrder {
                    order,
                    reason: reason.clone(),
                });
                ProcessOutcome::Unfulfilled { order_id, reason }
            }
        }
    }

    /// Drain the queue by calling [`process_next`](Self::process_next) until
    /// it is empty. Outcomes come back in submission order.
    pub fn process_all(&mut self, ledger: &mut InventoryLedger) -> Vec<ProcessOutcome> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while !self.pending.is_empty() {
            outcomes.push(self.process_next(ledger));
        }
        tracing::info!(
            processed = outcomes.len(),
            fulfilled = self.fulfilled.len(),
            unfulfilled = self.unfulfilled.len(),
            "pending queue drained"
        );
        outcomes
    }

    /// Pending orders, head first.
    pub fn pending(&self) -> impl ExactSizeIterator<Item = &Order> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn fulfilled(&self) -> &[Order] {
        &self.fulfilled
    }

    pub fn unfulfilled(&self) -> &[UnfulfilledOrder] {
        &self.unfulfilled
    }

    /// Total orders held across all three containers.
    pub fn total_orders(&self) -> usize {
        self.pending.len() + self.fulfilled.len() + self.unfulfilled.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.fulfilled.clear();
        self.unfulfilled.clear();
    }

    pub fn snapshot(&self) -> OrdersSnapshot {
        OrdersSnapshot {
            pending: self.pending.iter().cloned().collect(),
            fulfilled: self.fulfilled.clone(),
            unfulfilled: self.unfulfilled.clone(),
        }
    }

    /// Replace all three containers with the snapshot's contents.
    pub fn restore(&mut self, snapshot: OrdersSnapshot) {
        self.pending = snapshot.pending.into();
        self.fulfilled = snapshot.fulfilled;
        self.unfulfilled = snapshot.unfulfilled;
        tracing::info!(
            pending = self.pending.len(),
            fulfilled = self.fulfilled.len(),
            unfulfilled = self.unfulfilled.len(),
            "orders restored"
        );
    }
}
