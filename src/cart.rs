//! In-progress order for one session

use serde::Serialize;

use crate::menu::{MenuItem, Price};

/// One distinct item in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub item_name: String,
    pub quantity: u32,
    /// Price at the time the item was first added
    pub unit_price: Price,
}

impl CartLine {
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Result of a removal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The whole line was deleted
    Removed,
    /// One unit was taken off
    Decremented { remaining: u32 },
    /// The item was not in the cart
    NotInCart,
}

/// Items the customer has asked for, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `delta` units of an item and return the resulting quantity
    ///
    /// A delta of 0 counts as 1.
    pub fn add(&mut self, item: &MenuItem, delta: u32) -> u32 {
        let delta = delta.max(1);

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_name == item.name) {
            line.quantity = line.quantity.saturating_add(delta);
            return line.quantity;
        }

        self.lines.push(CartLine {
            item_name: item.name.clone(),
            quantity: delta,
            unit_price: item.unit_price,
        });
        delta
    }

    /// Remove an item, entirely or one unit at a time
    pub fn remove(&mut self, item_name: &str, full_removal: bool) -> RemoveOutcome {
        let Some(index) = self.lines.iter().position(|l| l.item_name == item_name) else {
            return RemoveOutcome::NotInCart;
        };

        let line = &mut self.lines[index];
        if full_removal || line.quantity <= 1 {
            self.lines.remove(index);
            return RemoveOutcome::Removed;
        }

        line.quantity -= 1;
        RemoveOutcome::Decremented {
            remaining: line.quantity,
        }
    }

    /// Sum of quantity times unit price over all lines
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of an item, 0 when absent
    #[must_use]
    pub fn quantity_of(&self, item_name: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.item_name == item_name)
            .map_or(0, |l| l.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, cents: u64) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            category: "brasa".to_string(),
            unit_price: Price::from_cents(cents),
            aliases: Vec::new(),
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let pollo = item("1 POLLO A LA BRASA", 5390);
        let papas = item("PAPAS FRITAS", 900);
        let mut cart = Cart::new();

        assert_eq!(cart.add(&pollo, 1), 1);
        assert_eq!(cart.add(&papas, 1), 1);
        assert_eq!(cart.add(&papas, 1), 2);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].item_name, "1 POLLO A LA BRASA");
        assert_eq!(cart.total(), Price::from_cents(7190));
    }

    #[test]
    fn test_zero_delta_counts_as_one() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(&item("ANTICUCHOS", 2200), 0), 1);
    }

    #[test]
    fn test_unit_price_snapshot() {
        let mut cart = Cart::new();
        cart.add(&item("CHULETA", 2500), 1);
        cart.add(&item("CHULETA", 3000), 1);
        assert_eq!(cart.total(), Price::from_cents(5000));
    }

    #[test]
    fn test_total_matches_sum_of_lines() {
        let items = [item("A", 150), item("B", 1990), item("C", 5)];
        let mut cart = Cart::new();
        let mut expected = 0;
        for (i, it) in items.iter().cycle().take(20).enumerate() {
            let n = u32::try_from(i % 4).unwrap();
            cart.add(it, n);
            expected += it.unit_price.cents() * u64::from(n.max(1));
        }
        assert_eq!(cart.total().cents(), expected);
    }

    #[test]
    fn test_remove() {
        let pollo = item("1 POLLO A LA BRASA", 5390);
        let papas = item("PAPAS FRITAS", 900);
        let mut cart = Cart::new();
        cart.add(&pollo, 1);
        cart.add(&papas, 3);

        assert_eq!(
            cart.remove("PAPAS FRITAS", false),
            RemoveOutcome::Decremented { remaining: 2 }
        );
        assert_eq!(cart.remove("PAPAS FRITAS", true), RemoveOutcome::Removed);
        assert_eq!(cart.quantity_of("PAPAS FRITAS"), 0);
        assert_eq!(cart.quantity_of("1 POLLO A LA BRASA"), 1);
    }

    #[test]
    fn test_remove_last_unit_deletes_line() {
        let mut cart = Cart::new();
        cart.add(&item("SALCHIPAPA", 1400), 1);
        assert_eq!(cart.remove("SALCHIPAPA", false), RemoveOutcome::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(&item("MOLLEJITAS", 2000), 2);
        let before = cart.clone();

        assert_eq!(cart.remove("ANTICUCHOS", true), RemoveOutcome::NotInCart);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_empty_total_is_zero() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), Price::ZERO);
        cart.add(&item("A", 100), 1);
        cart.clear();
        assert_eq!(cart.total(), Price::ZERO);
    }
}
