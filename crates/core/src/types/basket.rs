//! Shopping basket and its line items.
//!
//! A basket holds at most one line per product. Adding a product that is
//! already in the basket increases that line's quantity instead of adding a
//! second line, and the line keeps its original position.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;
use crate::types::quantity::Quantity;

/// One basket entry: a product snapshot and the requested quantity.
///
/// Title, price and thumbnail are denormalized copies taken when the item was
/// added; they are not refreshed if the catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product this line refers to. Also identifies the line.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub title: String,
    pub price: Price,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl LineItem {
    /// Price of the whole line (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// The current basket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    items: Vec<LineItem>,
}

impl Basket {
    /// An empty basket.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a basket from arbitrary lines, folding duplicate product ids.
    ///
    /// Duplicates are merged into the first occurrence; its snapshot wins.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        items.into_iter().fold(Self::new(), |mut basket, item| {
            basket.add(item);
            basket
        })
    }

    /// Add a line, merging with an existing line for the same product.
    pub fn add(&mut self, item: LineItem) {
        match self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    /// Remove the line for `product_id`.
    ///
    /// Returns the removed line, or `None` (leaving the basket untouched) if the
    /// product was not in the basket.
    pub fn remove(&mut self, product_id: ProductId) -> Option<LineItem> {
        let index = self
            .items
            .iter()
            .position(|line| line.product_id == product_id)?;
        Some(self.items.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether a line exists for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|line| line.product_id == product_id)
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, line| count.saturating_add(line.quantity.get()))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

impl FromIterator<LineItem> for Basket {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}
