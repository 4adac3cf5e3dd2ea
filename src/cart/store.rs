//! Cart store

use std::sync::Arc;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tracing::info;

use crate::{
    cart::{Cart, CartError, CartItem},
    courses::Course,
    ids::CourseId,
    pricing::{CartSummary, PricingError, VolumeDiscount},
    storage::{KeyValueStore, Persisted, StorageError, WhenEmpty},
};

/// Storage key for cart lines. Absent means empty.
pub const CART_KEY: &str = "cart";

/// A [`Cart`] that writes its lines out after every change.
///
/// Changes are applied to a copy and only kept once the write succeeds, so a
/// failed write leaves the cart as it was.
#[derive(Debug)]
pub struct CartStore {
    cart: Cart,
    persisted: Persisted<CartItem>,
}

impl CartStore {
    /// Load the stored cart; a missing or corrupt value starts empty.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    pub fn open(
        storage: Arc<dyn KeyValueStore>,
        currency: &'static Currency,
    ) -> Result<Self, StorageError> {
        let persisted = Persisted::new(storage, CART_KEY, WhenEmpty::RemoveKey);
        let items = persisted.load()?.unwrap_or_default();

        Ok(Self {
            cart: Cart::with_items(items, currency),
            persisted,
        })
    }

    /// Current cart state.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Whether a line for `id` exists.
    pub fn contains(&self, id: &CourseId) -> bool {
        self.cart.contains(id)
    }

    /// Sum of quantities.
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Exact total price.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the arithmetic overflowed.
    pub fn total_price(&self) -> Result<Money<'static, Currency>, CartError> {
        self.cart.total_price()
    }

    /// Subtotal, volume discount and total.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the arithmetic overflowed.
    pub fn summary(&self, discount: &VolumeDiscount) -> Result<CartSummary, PricingError> {
        CartSummary::for_cart(&self.cart, discount)
    }

    /// Add `quantity` of `course` and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the quantity is rejected or the cart could
    /// not be persisted.
    pub fn add_item(&mut self, course: &Course, quantity: u32) -> Result<u32, CartError> {
        let mut staged = self.cart.clone();
        let quantity = staged.add_item(course, quantity, Timestamp::now())?;

        self.commit(staged)?;

        info!(course_id = %course.id, quantity, "added to cart");

        Ok(quantity)
    }

    /// Remove the line for `id` and persist if anything changed.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart could not be persisted.
    pub fn remove_item(&mut self, id: &CourseId) -> Result<Option<CartItem>, CartError> {
        let mut staged = self.cart.clone();
        let removed = staged.remove_item(id);

        if removed.is_some() {
            self.commit(staged)?;
            info!(course_id = %id, "removed from cart");
        }

        Ok(removed)
    }

    /// Replace a line quantity and persist if anything changed.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the quantity is rejected or the cart could
    /// not be persisted.
    pub fn set_quantity(&mut self, id: &CourseId, quantity: u32) -> Result<bool, CartError> {
        let mut staged = self.cart.clone();
        let updated = staged.set_quantity(id, quantity)?;

        if updated {
            self.commit(staged)?;
            info!(course_id = %id, quantity, "cart quantity changed");
        }

        Ok(updated)
    }

    /// Empty the cart, removing the stored key.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart could not be persisted.
    pub fn clear(&mut self) -> Result<Vec<CartItem>, CartError> {
        let mut staged = self.cart.clone();
        let removed = staged.clear();

        self.commit(staged)?;

        info!(lines = removed.len(), "cleared cart");

        Ok(removed)
    }

    fn commit(&mut self, staged: Cart) -> Result<(), StorageError> {
        self.persisted.save(staged.items())?;
        self.cart = staged;

        Ok(())
    }
}
