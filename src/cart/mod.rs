//! Cart
//!
//! Purchase intent for the current visitor. [`Cart`] is the pure state; every
//! transition returns what changed and never touches storage. [`CartStore`]
//! pairs it with persistence.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{courses::Course, ids::CourseId, pricing::total_price};

pub mod errors;
pub mod models;
mod store;

pub use errors::CartError;
pub use models::CartItem;
pub use store::{CART_KEY, CartStore};

/// Cart contents, at most one line per course.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a cart from previously stored lines.
    pub fn with_items(items: Vec<CartItem>, currency: &'static Currency) -> Self {
        Self { items, currency }
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line for `id`, if present.
    pub fn get(&self, id: &CourseId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether a line for `id` exists.
    pub fn contains(&self, id: &CourseId) -> bool {
        self.get(id).is_some()
    }

    /// Add `quantity` of `course`. An existing line for the same course has its
    /// quantity increased; otherwise a new snapshot line is appended.
    ///
    /// Returns the resulting quantity of the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity and
    /// [`CartError::QuantityOverflow`] if the line quantity would overflow.
    /// The cart is unchanged in both cases.
    pub fn add_item(
        &mut self,
        course: &Course,
        quantity: u32,
        now: Timestamp,
    ) -> Result<u32, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self.items.iter_mut().find(|item| item.id() == &course.id) {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| CartError::QuantityOverflow(course.id.clone()))?;

            return Ok(existing.quantity);
        }

        self.items.push(CartItem::new(course.clone(), quantity, now));

        Ok(quantity)
    }

    /// Remove the line for `id`, returning it if present.
    pub fn remove_item(&mut self, id: &CourseId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;

        Some(self.items.remove(index))
    }

    /// Replace the quantity of the line for `id`.
    ///
    /// Returns `false` if there is no such line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity; the stored
    /// quantity is unchanged.
    pub fn set_quantity(&mut self, id: &CourseId, quantity: u32) -> Result<bool, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            debug!(course_id = %id, "quantity change ignored, not in cart");
            return Ok(false);
        };

        item.quantity = quantity;

        Ok(true)
    }

    /// Remove every line, returning them.
    pub fn clear(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }

    /// Sum of quantities across all lines.
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Exact sum of price × quantity across all lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::TotalPrice`] if the arithmetic overflowed.
    pub fn total_price(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(total_price(&self.items, self.currency)?)
    }
}
