//! Stable ordering of trade history records.

use chrono::NaiveDate;

use crate::domain::{Order, OrderKind};

/// Ordering key for orders: date first, then Buy before Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderOrderingKey {
    pub date: NaiveDate,
    pub kind: OrderKind,
}

impl OrderOrderingKey {
    pub fn from_order(order: &Order) -> Self {
        OrderOrderingKey {
            date: order.date,
            kind: order.kind,
        }
    }
}

/// Sort orders by (date, kind). The sort is stable, so orders sharing a key
/// keep their insertion order.
pub fn sort_orders(orders: &mut [Order]) {
    orders.sort_by_key(OrderOrderingKey::from_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, OrderRequest};

    fn make_order(kind: OrderKind, symbol: &str, y: i32, m: u32, d: u32) -> Order {
        let req = OrderRequest::new(
            kind,
            symbol,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            1,
            Decimal::from_qty(10),
            Decimal::from_qty(1),
        );
        Order::from_validated(&req, req.validate().unwrap())
    }

    #[test]
    fn test_sort_by_date_then_kind() {
        let mut orders = vec![
            make_order(OrderKind::Sell, "A", 2021, 1, 5),
            make_order(OrderKind::Buy, "A", 2021, 1, 5),
            make_order(OrderKind::Buy, "B", 2021, 1, 1),
        ];

        sort_orders(&mut orders);

        assert_eq!(orders[0].symbol.as_str(), "B");
        assert_eq!(orders[1].kind, OrderKind::Buy);
        assert_eq!(orders[2].kind, OrderKind::Sell);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut orders = vec![
            make_order(OrderKind::Buy, "Z", 2021, 1, 1),
            make_order(OrderKind::Buy, "A", 2021, 1, 1),
            make_order(OrderKind::Buy, "M", 2021, 1, 1),
        ];

        sort_orders(&mut orders);

        let symbols: Vec<&str> = orders.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Z", "A", "M"]);
    }
}
