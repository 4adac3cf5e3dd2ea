//! Learning dashboard figures

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use super::EnrolledCourse;

/// Totals shown on the learning dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearningStats {
    /// Enrolled courses
    pub enrolled: usize,

    /// Courses at 100% progress
    pub completed: usize,

    /// Certificates earned, one per completed course
    pub certificates: usize,

    /// Total normalised hours, rounded to a whole number
    pub learning_hours: u64,
}

impl LearningStats {
    /// Figures for `courses`.
    pub fn from_enrollments(courses: &[EnrolledCourse]) -> Self {
        let completed = courses.iter().filter(|course| course.is_complete()).count();
        let hours: Decimal = courses.iter().map(EnrolledCourse::hours).sum();

        Self {
            enrolled: courses.len(),
            completed,
            certificates: completed,
            learning_hours: hours
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u64()
                .unwrap_or_default(),
        }
    }
}
