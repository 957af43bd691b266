use chrono::NaiveDate;
use tradebook::{Decimal, LedgerConfig, LedgerEngine, OrderRequest};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn day(y: i32, m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, dd).unwrap()
}

fn build_ledger() -> LedgerEngine {
    let mut ledger = LedgerEngine::new(LedgerConfig::new(d("1")));
    let orders = [
        OrderRequest::buy("ABC", day(2021, 1, 4), 10, d("10"), d("1")),
        OrderRequest::buy("ABC", day(2021, 1, 20), 10, d("20"), d("1")),
        OrderRequest::sell("ABC", day(2021, 2, 1), 5, d("18"), d("1")),
        OrderRequest::buy("XYZ", day(2021, 2, 15), 2, d("50"), d("1")),
        OrderRequest::sell("XYZ", day(2021, 12, 30), 2, d("40"), d("1")),
        OrderRequest::buy("ABC", day(2022, 1, 3), 1, d("10"), d("1")),
    ];
    for order in &orders {
        ledger.record_order(order).unwrap();
    }
    ledger
}

#[test]
fn test_months_are_grouped_in_calendar_order() {
    let rows = build_ledger().monthly_activity();
    let months: Vec<(i32, u32)> = rows.iter().map(|r| (r.year, r.month)).collect();
    assert_eq!(months, vec![(2021, 1), (2021, 2), (2021, 12), (2022, 1)]);
}

#[test]
fn test_spent_and_received_sums() {
    let rows = build_ledger().monthly_activity();

    // January: two buys of 101 and 201
    assert_eq!(rows[0].spent, d("302"));
    assert!(rows[0].received.is_zero());

    // February: one sell of 89 and one buy of 101
    assert_eq!(rows[1].spent, d("101"));
    assert_eq!(rows[1].received, d("89"));

    // December: one sell of 79
    assert!(rows[2].spent.is_zero());
    assert_eq!(rows[2].received, d("79"));
}

#[test]
fn test_profit_is_left_joined() {
    let rows = build_ledger().monthly_activity();
    assert_eq!(rows[0].profit, None);
    assert_eq!(rows[1].profit, Some(d("13.5")));
    // 2 * (39.5 - 50.5)
    assert_eq!(rows[2].profit, Some(d("-22")));
    assert_eq!(rows[3].profit, None);
}

#[test]
fn test_each_order_feeds_exactly_one_column() {
    let ledger = build_ledger();
    let rows = ledger.monthly_activity();

    let spent: Decimal = rows.iter().map(|r| r.spent).sum();
    let received: Decimal = rows.iter().map(|r| r.received).sum();
    let bought: Decimal = ledger.purchase_orders().iter().map(|o| o.gross_total).sum();
    let sold: Decimal = ledger.sale_orders().iter().map(|o| o.gross_total).sum();

    assert_eq!(spent, bought);
    assert_eq!(received, sold);
}

#[test]
fn test_empty_ledger_has_no_months() {
    assert!(LedgerEngine::default().monthly_activity().is_empty());
}
