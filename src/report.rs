//! Console formatting for ledger views.
//!
//! Money columns are shown with two decimals, average prices with four.

use crate::domain::Order;
use crate::engine::{
    HoldingsEntry, MonthlyActivity, ProfitEstimate, RealizedProfitEntry, Summary,
};

const RULE: &str = "----------------------";

fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn format_holdings(holdings: &[HoldingsEntry]) -> String {
    if holdings.is_empty() {
        return "(no holdings)\n".to_string();
    }
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<8} {:>8} {:>12} {:>14} {:>12}",
            "symbol", "qty", "avg cost", "total", "break even"
        ),
    );
    for h in holdings {
        push_line(
            &mut out,
            format!(
                "{:<8} {:>8} {:>12.4} {:>14.2} {:>12.4}",
                h.symbol, h.quantity, h.avg_cost, h.total_cost, h.break_even_price
            ),
        );
    }
    out
}

pub fn format_history<'a>(orders: impl IntoIterator<Item = &'a Order>) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<10} {:<4} {:<8} {:>8} {:>10} {:>8} {:>14} {:>12}",
            "date", "kind", "symbol", "qty", "price", "fees", "total", "avg cost"
        ),
    );
    for o in orders {
        push_line(
            &mut out,
            format!(
                "{:<10} {:<4} {:<8} {:>8} {:>10.2} {:>8.2} {:>14.2} {:>12.4}",
                o.date.to_string(),
                o.kind,
                o.symbol,
                o.quantity,
                o.price_per_unit,
                o.fees,
                o.gross_total,
                o.avg_unit_cost
            ),
        );
    }
    out
}

pub fn format_realized(entries: &[RealizedProfitEntry]) -> String {
    if entries.is_empty() {
        return "(no realized profit)\n".to_string();
    }
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<10} {:<8} {:>8} {:>12} {:>12} {:>12} {:>12}",
            "date", "symbol", "qty", "avg cost", "avg sale", "per unit", "profit"
        ),
    );
    for r in entries {
        push_line(
            &mut out,
            format!(
                "{:<10} {:<8} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.2}",
                r.date.to_string(),
                r.symbol,
                r.quantity,
                r.avg_cost_at_sale,
                r.avg_sale_price,
                r.avg_profit_per_unit,
                r.total_profit
            ),
        );
    }
    out
}

pub fn format_monthly_activity(rows: &[MonthlyActivity]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<7} {:>14} {:>14} {:>12}",
            "month", "spent", "received", "profit"
        ),
    );
    for row in rows {
        let profit = row
            .profit
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        push_line(
            &mut out,
            format!(
                "{:04}-{:02} {:>14.2} {:>14.2} {:>12}",
                row.year, row.month, row.spent, row.received, profit
            ),
        );
    }
    out
}

pub fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();
    push_line(&mut out, RULE);
    push_line(&mut out, "--- Current state ---");
    push_line(&mut out, RULE);
    push_line(&mut out, format!("First trade: {}", date_or_dash(summary.first_trade)));
    push_line(&mut out, format!("Last trade:  {}", date_or_dash(summary.last_trade)));
    out.push('\n');
    push_line(&mut out, "Holdings:");
    out.push_str(&format_holdings(&summary.holdings));
    out.push('\n');
    push_line(&mut out, format!("Total bought:          {:>12.2}", summary.total_bought));
    push_line(&mut out, format!("Total sold:            {:>12.2}", summary.total_sold));
    push_line(&mut out, format!("Total in custody:      {:>12.2}", summary.total_custody));
    push_line(
        &mut out,
        format!("Total realized profit: {:>12.2}", summary.total_realized_profit),
    );
    out
}

pub fn format_estimate(estimate: &ProfitEstimate) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "Selling {} {} at {:.4} each (fees {:.2})",
            estimate.quantity, estimate.symbol, estimate.price_per_unit, estimate.fees
        ),
    );
    push_line(&mut out, format!("Profit per unit: {:.4}", estimate.profit_per_unit));
    push_line(&mut out, format!("Total profit:    {:.2}", estimate.profit));
    out
}
