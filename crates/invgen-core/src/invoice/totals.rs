//! Derived invoice totals.

use serde::{Deserialize, Serialize};

use crate::models::invoice::LineItem;

/// Subtotal, tax and grand total of an invoice.
///
/// Never stored; computed from the line items on every read. No rounding
/// happens here, only at display time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
}

impl Totals {
    /// Compute totals. Non-finite amounts and tax rates count as 0.
    pub fn compute(items: &[LineItem], tax_rate: f64) -> Self {
        let subtotal: f64 = items.iter().map(|item| finite_or_zero(item.amount())).sum();
        let tax_amount = subtotal * finite_or_zero(tax_rate) / 100.0;
        Self {
            subtotal,
            tax_amount,
            total: subtotal + tax_amount,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::input::format_amount;
    use crate::models::config::DefaultsConfig;
    use crate::models::invoice::{Invoice, LineUpdate};
    use chrono::Utc;

    fn invoice_with(items: &[(f64, f64)], tax_rate: f64) -> Invoice {
        let mut invoice = Invoice::with_defaults(&DefaultsConfig::default(), Utc::now());
        for (i, (quantity, rate)) in items.iter().enumerate() {
            let id = if i == 0 {
                invoice.line_items()[0].id().clone()
            } else {
                invoice.add_line_item()
            };
            invoice.update_line_item(id.as_str(), LineUpdate::Quantity(*quantity));
            invoice.update_line_item(id.as_str(), LineUpdate::Rate(*rate));
        }
        invoice.set_tax_rate(tax_rate);
        invoice
    }

    #[test]
    fn test_two_items_with_tax() {
        let totals = invoice_with(&[(2.0, 50.0), (1.0, 30.0)], 10.0).totals();
        assert_eq!(format_amount(totals.subtotal), "130.00");
        assert_eq!(format_amount(totals.tax_amount), "13.00");
        assert_eq!(format_amount(totals.total), "143.00");
    }

    #[test]
    fn test_zero_amounts() {
        let totals = invoice_with(&[(1.0, 0.0)], 10.0).totals();
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_zero_tax() {
        let totals = invoice_with(&[(3.0, 33.33)], 0.0).totals();
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_relations_hold() {
        let totals = invoice_with(&[(1.5, 19.99), (7.0, 3.1), (0.0, 100.0)], 23.0).totals();
        let expected_subtotal = 1.5 * 19.99 + 7.0 * 3.1;
        assert!((totals.subtotal - expected_subtotal).abs() < 1e-9);
        assert!((totals.tax_amount - totals.subtotal * 0.23).abs() < 1e-9);
        assert_eq!(totals.total, totals.subtotal + totals.tax_amount);
    }

    #[test]
    fn test_non_finite_tax_rate_counts_as_zero() {
        let invoice = invoice_with(&[(2.0, 5.0)], 0.0);
        let totals = Totals::compute(invoice.line_items(), f64::NAN);
        assert_eq!(totals.subtotal, 10.0);
        assert_eq!(totals.tax_amount, 0.0);
    }
}
