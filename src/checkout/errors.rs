//! Checkout errors.

use std::time::Duration;

use thiserror::Error;

use crate::{
    cart::CartError, checkout::PaymentError, enrollments::EnrollmentError, pricing::PricingError,
};

/// Errors that end a checkout without fulfilling it.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("checkout was cancelled")]
    Cancelled,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("payment did not complete within {0:?}")]
    PaymentTimeout(Duration),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
}
