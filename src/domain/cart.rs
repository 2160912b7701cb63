//! Client-held shopping cart.
//!
//! The cart never exists server-side. This module is the single source of
//! truth for its semantics, and the serialized form of [`Cart::lines`] is the
//! durable-storage format clients persist under [`STORAGE_KEY`] and rewrite
//! after every mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Money;

/// Well-known durable-storage key for the serialized line array.
pub const STORAGE_KEY: &str = "aurea.cart.v1";

/// Stock ceiling applied to pre-order lines, which track no stock.
pub const PRE_ORDER_STOCK_LIMIT: u32 = u32::MAX;

/// One row in the cart: a product (optionally a specific variant) plus a
/// display snapshot captured at add-time. The snapshot is never re-fetched;
/// price drift before checkout is reconciled manually over WhatsApp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<Uuid>,
    pub name: String,
    pub unit_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
    pub stock_limit: u32,
    #[serde(default)]
    pub is_pre_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_order_eta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_details: Option<String>,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    fn matches(&self, product_id: Uuid, variant_id: Option<Uuid>) -> bool {
        self.product_id == product_id && self.variant_id == variant_id
    }

    fn quantity_ceiling(&self) -> u32 {
        self.stock_limit.max(1)
    }
}

/// The customer's in-progress selection. Line identity is the pair
/// (`product_id`, `variant_id`); additions with the same pair merge.
///
/// Every operation is infallible: over-limit quantity requests saturate at
/// the line's stock limit instead of reporting an error.
#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    drawer_open: bool,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a cart from lines previously read out of durable storage.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self {
            lines,
            drawer_open: false,
        }
    }

    /// The serialized form of this slice is what clients persist.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total_price(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc.add(l.line_total()))
    }

    /// Adds `item.quantity` units (floored at 1), merging with an existing
    /// line for the same (product, variant) pair. The resulting quantity
    /// saturates at the line's stock limit.
    pub fn add(&mut self, mut item: CartLine) {
        let requested = item.quantity.max(1);
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(item.product_id, item.variant_id))
        {
            existing.quantity = existing
                .quantity
                .saturating_add(requested)
                .min(existing.quantity_ceiling());
        } else {
            item.quantity = requested.min(item.quantity_ceiling());
            self.lines.push(item);
        }
    }

    /// Sets a line's quantity directly, clamped to `[1, stock_limit]`.
    /// A quantity of zero removes the line. No-op if the line is absent.
    pub fn update_quantity(&mut self, product_id: Uuid, variant_id: Option<Uuid>, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id, variant_id);
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(product_id, variant_id))
        {
            line.quantity = quantity.min(line.quantity_ceiling());
        }
    }

    /// Deletes the matching line. No-op if absent.
    pub fn remove(&mut self, product_id: Uuid, variant_id: Option<Uuid>) {
        self.lines
            .retain(|l| !l.matches(product_id, variant_id));
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // Drawer visibility is UI state only; it is not part of the snapshot.

    pub fn open_drawer(&mut self) {
        self.drawer_open = true;
    }

    pub fn close_drawer(&mut self) {
        self.drawer_open = false;
    }

    pub fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn line(product: Uuid, variant: Option<Uuid>, price: i64, quantity: u32, stock: u32) -> CartLine {
        CartLine {
            product_id: product,
            variant_id: variant,
            name: "Collar Luna".into(),
            unit_price: Money::new(Decimal::new(price, 0)),
            image_url: None,
            quantity,
            stock_limit: stock,
            is_pre_order: false,
            pre_order_eta: None,
            variant_details: None,
        }
    }

    #[test]
    fn add_merges_lines_with_same_identity() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(p1, None, 100, 2, 10));
        cart.add(line(p1, None, 100, 3, 10));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn add_saturates_at_stock_limit() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(p1, None, 100, 2, 3));
        cart.add(line(p1, None, 100, 5, 3));
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.total_price().amount(), Decimal::new(300, 0));
    }

    #[test]
    fn add_clamps_fresh_lines_too() {
        let mut cart = Cart::new();
        cart.add(line(Uuid::new_v4(), None, 100, 9, 4));
        assert_eq!(cart.lines()[0].quantity, 4);
    }

    #[test]
    fn add_floors_requested_quantity_at_one() {
        let mut cart = Cart::new();
        cart.add(line(Uuid::new_v4(), None, 100, 0, 5));
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn variant_lines_are_distinct_from_base_lines() {
        let p1 = Uuid::new_v4();
        let v1 = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(p1, None, 100, 1, 10));
        cart.add(line(p1, Some(v1), 100, 1, 10));
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn update_quantity_clamps_and_zero_removes() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(p1, None, 100, 2, 3));
        cart.update_quantity(p1, None, 1);
        assert_eq!(cart.lines()[0].quantity, 1);
        cart.update_quantity(p1, None, 99);
        assert_eq!(cart.lines()[0].quantity, 3);
        cart.update_quantity(p1, None, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_on_absent_line_is_a_noop() {
        let mut cart = Cart::new();
        cart.add(line(Uuid::new_v4(), None, 100, 1, 5));
        cart.update_quantity(Uuid::new_v4(), None, 3);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn remove_is_unconditional_and_noop_when_absent() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(p1, None, 100, 2, 5));
        cart.remove(Uuid::new_v4(), None);
        assert_eq!(cart.lines().len(), 1);
        cart.remove(p1, None);
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_empties_lines_and_totals() {
        let mut cart = Cart::new();
        cart.add(line(Uuid::new_v4(), None, 100, 2, 5));
        cart.add(line(Uuid::new_v4(), None, 50, 1, 5));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Money::zero());
    }

    #[test]
    fn totals_track_quantities_and_prices() {
        let mut cart = Cart::new();
        cart.add(line(Uuid::new_v4(), None, 100, 2, 5));
        cart.add(line(Uuid::new_v4(), None, 50, 3, 5));
        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price().amount(), Decimal::new(350, 0));
    }

    #[test]
    fn pre_order_lines_grow_unbounded() {
        let p1 = Uuid::new_v4();
        let mut pre_order = line(p1, None, 100, 50_000, PRE_ORDER_STOCK_LIMIT);
        pre_order.is_pre_order = true;
        pre_order.pre_order_eta = Some("2-3 semanas".into());
        let mut cart = Cart::new();
        cart.add(pre_order.clone());
        cart.add(pre_order);
        assert_eq!(cart.lines()[0].quantity, 100_000);
    }

    #[test]
    fn snapshot_round_trip_preserves_the_cart() {
        let p1 = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(line(p1, Some(Uuid::new_v4()), 250, 2, 4));
        cart.add(line(Uuid::new_v4(), None, 80, 1, 9));

        let stored = serde_json::to_string(cart.lines()).unwrap();
        let reloaded = Cart::from_lines(serde_json::from_str(&stored).unwrap());

        assert_eq!(reloaded.lines(), cart.lines());
        assert_eq!(reloaded.total_items(), cart.total_items());
        assert_eq!(reloaded.total_price(), cart.total_price());
    }

    #[test]
    fn drawer_state_is_ui_only() {
        let mut cart = Cart::new();
        assert!(!cart.is_drawer_open());
        cart.open_drawer();
        assert!(cart.is_drawer_open());
        cart.close_drawer();
        assert!(!cart.is_drawer_open());
    }

    // Scenario from the product brief: adding stock-3 item twice never
    // oversells, and direct quantity updates behave like the storefront UI.
    #[test]
    fn storefront_scenario() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let v1 = Uuid::new_v4();
        let mut cart = Cart::new();

        cart.add(line(p1, None, 100, 2, 3));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_price().amount(), Decimal::new(200, 0));

        cart.add(line(p1, None, 100, 5, 3));
        assert_eq!(cart.lines()[0].quantity, 3);

        cart.add(line(p2, Some(v1), 50, 1, 10));
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 4);

        cart.update_quantity(p1, None, 1);
        assert_eq!(cart.lines()[0].quantity, 1);
        cart.update_quantity(p1, None, 0);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product_id, p2);
    }
}
