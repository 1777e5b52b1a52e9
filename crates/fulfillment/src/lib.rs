//! Order fulfillment.
//!
//! Orders are queued FIFO and resolved one at a time against the inventory
//! ledger: every line is checked first, and stock is only decremented when
//! the whole order can be served.

pub mod engine;
pub mod order;
pub mod shared;
pub mod warehouse;

pub use engine::{FulfillmentEngine, OrdersSnapshot, ProcessOutcome};
pub use order::{Order, OrderLine, UnfulfilledOrder};
pub use shared::SharedWarehouse;
pub use warehouse::{Warehouse, WarehouseSnapshot};
