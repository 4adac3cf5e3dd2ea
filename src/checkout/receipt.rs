//! Checkout receipt

use rusty_money::{Money, iso::Currency};

use crate::ids::CourseId;

/// Outcome of a completed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    amount: Money<'static, Currency>,
    reference: String,
    enrolled: Vec<CourseId>,
    already_owned: Vec<CourseId>,
}

impl CheckoutReceipt {
    /// An empty tally for a charge of `amount`.
    pub fn new(amount: Money<'static, Currency>, reference: String) -> Self {
        Self {
            amount,
            reference,
            enrolled: Vec::new(),
            already_owned: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, id: CourseId, created: bool) {
        if created {
            self.enrolled.push(id);
        } else {
            self.already_owned.push(id);
        }
    }

    /// Amount charged
    pub fn amount(&self) -> Money<'static, Currency> {
        self.amount
    }

    /// Payment reference
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Newly enrolled courses
    pub fn enrolled(&self) -> &[CourseId] {
        &self.enrolled
    }

    /// Courses that were already owned
    pub fn already_owned(&self) -> &[CourseId] {
        &self.already_owned
    }

    /// Number of new enrollments
    pub fn enrolled_count(&self) -> usize {
        self.enrolled.len()
    }

    /// Number of lines for courses already owned
    pub fn already_owned_count(&self) -> usize {
        self.already_owned.len()
    }
}
