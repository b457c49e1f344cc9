//! Cart lines and aggregates.

use crate::product::{Product, ProductId};
use serde::{Deserialize, Serialize};

/// A product in the cart together with how many units were added.
///
/// Serialized flat (product fields plus `quantity`), which is also the
/// persisted snapshot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn id(&self) -> ProductId {
        self.product.id
    }

    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// Price breakdown shown next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
}

/// Ordered cart lines, at most one per product id.
///
/// Aggregates are computed from the lines on every read, so they can never
/// drift from the line set. Deserialization goes through [`Cart::from_lines`]
/// which repairs snapshots that violate the invariants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from raw lines.
    ///
    /// Zero-quantity lines are dropped and repeated ids are merged into the
    /// first occurrence by summing quantities.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|line| line.quantity > 0) {
            match cart.line_mut(line.id()) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.lines.iter().any(|line| line.id() == id)
    }

    pub fn quantity_of(&self, id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.id() == id)
            .map(|line| line.quantity)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.lines.iter().map(|line| &line.product)
    }

    /// Adds one unit of `product`.
    ///
    /// An existing line is incremented in place; otherwise a new line is
    /// appended at the end. Returns the line's new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
        1
    }

    /// Sets the quantity of an existing line exactly.
    ///
    /// `quantity <= 0` removes the line. Unknown ids are left alone.
    /// Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.line_mut(id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Removes the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id() != id);
        self.lines.len() != before
    }

    /// Empties the cart. Returns whether there was anything to remove.
    pub fn clear(&mut self) -> bool {
        let had_lines = !self.lines.is_empty();
        self.lines.clear();
        had_lines
    }

    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Subtotal plus optional tax and shipping.
    pub fn price_summary(&self, tax: Option<f64>, shipping: Option<f64>) -> PriceSummary {
        let subtotal = self.total_price();
        let tax = tax.unwrap_or(0.0);
        let shipping = shipping.unwrap_or(0.0);
        PriceSummary {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
