use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, DomainResult, OrderId, Sku};
use warehouse_inventory::StockShortfall;

/// Order line: SKU and requested quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub sku: Sku,
    pub quantity: u64,
}

impl core::fmt::Display for OrderLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.sku, self.quantity)
    }
}

/// An immutable purchase order.
///
/// Lines keep the order they were given in; that order drives both the
/// availability check and the stock decrement. Serialized as
/// `{"order_id": ..., "items_ordered": {"A101": 10, ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOrder")]
pub struct Order {
    #[serde(rename = "order_id")]
    id: OrderId,
    #[serde(rename = "items_ordered", with = "items_ordered")]
    lines: Vec<OrderLine>,
}

impl Order {
    /// Build an order from `(sku, quantity)` pairs.
    ///
    /// Rejects an order with no lines, a zero quantity, or the same SKU twice.
    pub fn new(id: OrderId, lines: impl IntoIterator<Item = (Sku, u64)>) -> DomainResult<Self> {
        let mut seen = BTreeSet::new();
        let mut collected = Vec::new();
        for (sku, quantity) in lines {
            if quantity == 0 {
                return Err(DomainError::validation(format!(
                    "order {id}: quantity for {sku} must be positive"
                )));
            }
            if !seen.insert(sku.clone()) {
                return Err(DomainError::validation(format!(
                    "order {id}: {sku} appears more than once"
                )));
            }
            collected.push(OrderLine { sku, quantity });
        }
        if collected.is_empty() {
            return Err(DomainError::validation(format!("order {id}: no lines")));
        }
        Ok(Self {
            id,
            lines: collected,
        })
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Lines as `(sku, quantity)` pairs, in insertion order.
    pub fn requested(&self) -> impl Iterator<Item = (&Sku, u64)> + Clone + '_ {
        self.lines.iter().map(|line| (&line.sku, line.quantity))
    }

    /// `A101:10; B205:3`
    pub fn items_summary(&self) -> String {
        self.lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl core::fmt::Display for Order {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Order ID: {} | Items: {}", self.id, self.items_summary())
    }
}

#[derive(Deserialize)]
struct RawOrder {
    order_id: OrderId,
    #[serde(with = "items_ordered")]
    items_ordered: Vec<OrderLine>,
}

impl TryFrom<RawOrder> for Order {
    type Error = DomainError;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        Order::new(
            raw.order_id,
            raw.items_ordered.into_iter().map(|l| (l.sku, l.quantity)),
        )
    }
}

/// An order that could not be served, with the first line that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfulfilledOrder {
    #[serde(flatten)]
    pub order: Order,
    pub reason: StockShortfall,
}

/// Lines as a JSON object whose key order is the line order.
mod items_ordered {
    use core::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use warehouse_core::Sku;

    use super::OrderLine;

    pub fn serialize<S>(lines: &[OrderLine], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(lines.len()))?;
        for line in lines {
            map.serialize_entry(line.sku.as_str(), &line.quantity)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<OrderLine>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LinesVisitor;

        impl<'de> Visitor<'de> for LinesVisitor {
            type Value = Vec<OrderLine>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of SKU to requested quantity")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut lines = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((sku, quantity)) = access.next_entry::<Sku, u64>()? {
                    lines.push(OrderLine { sku, quantity });
                }
                Ok(lines)
            }
        }

        deserializer.deserialize_map(LinesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    fn order_id(s: &str) -> OrderId {
        OrderId::new(s).unwrap()
    }

    #[test]
    fn keeps_line_order() {
        let order = Order::new(
            order_id("X1"),
            [(sku("C310"), 1), (sku("A101"), 2), (sku("B205"), 3)],
        )
        .unwrap();
        let skus: Vec<_> = order.lines().iter().map(|l| l.sku.as_str()).collect();
        assert_eq!(skus, vec!["C310", "A101", "B205"]);
        assert_eq!(order.items_summary(), "C310:1; A101:2; B205:3");
    }

    #[test]
    fn rejects_zero_quantity_repeated_sku_and_empty_orders() {
        let zero = Order::new(order_id("X1"), [(sku("A101"), 0)]);
        assert!(matches!(zero, Err(DomainError::Validation(_))));

        let repeated = Order::new(order_id("X1"), [(sku("A101"), 1), (sku("A101"), 2)]);
        assert!(matches!(repeated, Err(DomainError::Validation(_))));

        let empty = Order::new(order_id("X1"), Vec::new());
        assert!(matches!(empty, Err(DomainError::Validation(_))));
    }

    #[test]
    fn json_shape_preserves_line_order() {
        let order = Order::new(order_id("X7"), [(sku("B205"), 3), (sku("A101"), 10)]).unwrap();

        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"{"order_id":"X7","items_ordered":{"B205":3,"A101":10}}"#);

        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn invalid_json_orders_are_rejected() {
        let zero = r#"{"order_id":"X1","items_ordered":{"A101":0}}"#;
        assert!(serde_json::from_str::<Order>(zero).is_err());

        let empty = r#"{"order_id":"X1","items_ordered":{}}"#;
        assert!(serde_json::from_str::<Order>(empty).is_err());
    }

    #[test]
    fn unfulfilled_order_carries_reason_inline() {
        let entry = UnfulfilledOrder {
            order: Order::new(order_id("X3"), [(sku("ZZZ9"), 1)]).unwrap(),
            reason: StockShortfall::UnknownSku { sku: sku("ZZZ9") },
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "order_id": "X3",
                "items_ordered": { "ZZZ9": 1 },
                "reason": { "kind": "unknown_sku", "sku": "ZZZ9" }
            })
        );

        let back: UnfulfilledOrder = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
