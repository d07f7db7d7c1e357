//! Invoice data model: header, ordered room-booking line items, payment
//! info, and the derived subtotal / balance-due figures.
//!
//! The model is a plain value type mutated through explicit operations —
//! no ambient singleton — so every operation is unit-testable without a UI
//! harness. Numeric fields are fed raw form text and coerce unparseable or
//! negative input to zero; coercion is uniform and never an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default rate for a freshly added room booking, in rupiah.
pub const DEFAULT_ROOM_RATE: f64 = 350_000.0;

/// Customer / document identification block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
}

/// One room-booking row.
///
/// The row amount is always `quantity × rate`; it is exposed as
/// [`LineItem::amount`] and cannot be set independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub rate: f64,
}

impl LineItem {
    /// Derived row amount.
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.rate
    }
}

/// Payment block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid_amount: f64,
}

/// Editable field of a line item, addressed by [`Invoice::update_line_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Quantity,
    Rate,
}

/// The invoice aggregate: header + ordered line items + payment info.
///
/// Lives in memory for one session only; serde support exists so the CLI
/// can load an invoice description from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub header: InvoiceHeader,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub payment: PaymentInfo,
}

impl Invoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line item with the default quantity of 1 and the fixed
    /// default room rate; its amount equals the rate.
    pub fn add_line_item(&mut self) {
        self.items.push(LineItem {
            description: String::new(),
            quantity: 1,
            rate: DEFAULT_ROOM_RATE,
        });
    }

    /// Mutate one field of one item from raw form text. Numeric fields go
    /// through the coercion policy; an out-of-range index is a silent no-op.
    pub fn update_line_item(&mut self, index: usize, field: ItemField, value: &str) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };
        match field {
            ItemField::Description => item.description = value.to_string(),
            ItemField::Quantity => item.quantity = coerce_quantity(value),
            ItemField::Rate => item.rate = coerce_amount(value),
        }
    }

    /// Remove the item at `index`; remaining items keep their relative
    /// order. Out-of-range indices are a silent no-op.
    pub fn remove_line_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    /// Set the paid amount from raw form text, with the same coercion
    /// policy as numeric item fields.
    pub fn set_paid_amount(&mut self, value: &str) {
        self.payment.paid_amount = coerce_amount(value);
    }

    /// Sum of all line-item amounts.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::amount).sum()
    }

    /// Subtotal minus paid amount; may be negative, not clamped.
    pub fn balance_due(&self) -> f64 {
        self.subtotal() - self.payment.paid_amount
    }
}

/// Coerce form text to a non-negative whole quantity. Fractional input is
/// floored; unparseable or negative input becomes zero.
fn coerce_quantity(value: &str) -> u32 {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v.floor().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Coerce form text to a non-negative currency amount; unparseable or
/// negative input becomes zero.
fn coerce_amount(value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice_with_items(n: usize) -> Invoice {
        let mut inv = Invoice::new();
        for _ in 0..n {
            inv.add_line_item();
        }
        inv
    }

    #[test]
    fn add_line_item_defaults() {
        let mut inv = Invoice::new();
        inv.add_line_item();
        let item = &inv.items[0];
        assert_eq!(item.quantity, 1);
        assert_eq!(item.rate, DEFAULT_ROOM_RATE);
        assert_eq!(item.amount(), DEFAULT_ROOM_RATE);
    }

    #[test]
    fn amount_tracks_quantity_and_rate() {
        let mut inv = invoice_with_items(1);
        inv.update_line_item(0, ItemField::Quantity, "3");
        assert_eq!(inv.items[0].amount(), 3.0 * DEFAULT_ROOM_RATE);
        inv.update_line_item(0, ItemField::Rate, "100000");
        assert_eq!(inv.items[0].amount(), 300_000.0);
    }

    #[test]
    fn subtotal_is_sum_of_amounts_through_op_sequences() {
        let mut inv = invoice_with_items(3);
        inv.update_line_item(0, ItemField::Quantity, "2");
        inv.update_line_item(1, ItemField::Rate, "125000");
        inv.remove_line_item(2);
        inv.add_line_item();
        inv.update_line_item(2, ItemField::Quantity, "0");

        let expected: f64 = inv.items.iter().map(LineItem::amount).sum();
        assert_eq!(inv.subtotal(), expected);
        assert_eq!(inv.subtotal(), 2.0 * DEFAULT_ROOM_RATE + 125_000.0);
    }

    #[test]
    fn balance_due_may_go_negative() {
        let mut inv = invoice_with_items(1);
        inv.set_paid_amount("500000");
        assert_eq!(inv.balance_due(), DEFAULT_ROOM_RATE - 500_000.0);
        assert!(inv.balance_due() < 0.0);
    }

    #[test]
    fn remove_shifts_indices_and_preserves_order() {
        let mut inv = invoice_with_items(4);
        for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
            inv.update_line_item(i, ItemField::Description, name);
        }
        inv.remove_line_item(1);
        let names: Vec<&str> = inv.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "D"]);
    }

    #[test]
    fn out_of_range_ops_are_silent() {
        let mut inv = invoice_with_items(1);
        inv.update_line_item(5, ItemField::Quantity, "9");
        inv.remove_line_item(5);
        assert_eq!(inv.items.len(), 1);
        assert_eq!(inv.items[0].quantity, 1);
    }

    #[test]
    fn unparseable_numeric_input_coerces_to_zero() {
        let mut inv = invoice_with_items(1);
        inv.update_line_item(0, ItemField::Quantity, "abc");
        assert_eq!(inv.items[0].quantity, 0);
        inv.update_line_item(0, ItemField::Rate, "12,5");
        assert_eq!(inv.items[0].rate, 0.0);
        inv.set_paid_amount("not a number");
        assert_eq!(inv.payment.paid_amount, 0.0);
    }

    #[test]
    fn negative_numeric_input_coerces_to_zero() {
        let mut inv = invoice_with_items(1);
        inv.update_line_item(0, ItemField::Quantity, "-3");
        assert_eq!(inv.items[0].quantity, 0);
        inv.update_line_item(0, ItemField::Rate, "-100");
        assert_eq!(inv.items[0].rate, 0.0);
    }

    #[test]
    fn fractional_quantity_is_floored() {
        let mut inv = invoice_with_items(1);
        inv.update_line_item(0, ItemField::Quantity, "2.9");
        assert_eq!(inv.items[0].quantity, 2);
    }

    #[test]
    fn invoice_json_roundtrip() {
        let mut inv = invoice_with_items(2);
        inv.header.customer_name = "Jane Doe".to_string();
        inv.header.invoice_number = "FAK-0001".to_string();
        let json = serde_json::to_string(&inv).unwrap();
        let parsed: Invoice = serde_json::from_str(&json).unwrap();
        assert_eq!(inv, parsed);
    }
}
