//! Cart Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{courses::Course, ids::CourseId};

/// A course snapshot the visitor intends to buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Course as it was when first added
    #[serde(flatten)]
    pub course: Course,

    /// Quantity, at least 1
    pub quantity: u32,

    /// When the line was created
    pub added_at: Timestamp,
}

impl CartItem {
    /// Create a line for `course`.
    pub fn new(course: Course, quantity: u32, added_at: Timestamp) -> Self {
        Self {
            course,
            quantity,
            added_at,
        }
    }

    /// Course id of this line
    pub fn id(&self) -> &CourseId {
        &self.course.id
    }
}
