//! Cart errors.

use thiserror::Error;

use crate::{ids::CourseId, pricing::TotalPriceError, storage::StorageError};

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantities start at 1.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    /// The line quantity would not fit in a `u32`.
    #[error("quantity for course {0} overflowed")]
    QuantityOverflow(CourseId),

    /// The cart total could not be computed.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// The cart could not be written.
    #[error("failed to persist cart")]
    Storage(#[from] StorageError),
}
