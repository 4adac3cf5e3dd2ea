//! Enrollment Models

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    courses::Course,
    ids::{CourseId, LectureId},
};

/// Completed lecture ids, in the order they were completed.
pub type CompletedLectures = SmallVec<[LectureId; 8]>;

/// A course the visitor owns, with their progress through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    /// Course as it was at enrollment, duration normalised to hours
    #[serde(flatten)]
    pub course: Course,

    /// When the enrollment was created
    pub enrolled_at: Timestamp,

    /// Last time a lecture was completed, or the enrollment time
    pub last_accessed: Timestamp,

    /// Percentage of lectures completed, derived from `completed_lectures`
    pub progress: u8,

    /// Completed lecture ids, no duplicates
    #[serde(default)]
    pub completed_lectures: CompletedLectures,
}

impl EnrolledCourse {
    /// Snapshot `course` as a fresh enrollment.
    pub fn new(course: &Course, now: Timestamp) -> Self {
        let mut course = course.clone();
        course.duration = course.duration.normalized();

        Self {
            course,
            enrolled_at: now,
            last_accessed: now,
            progress: 0,
            completed_lectures: CompletedLectures::new(),
        }
    }

    /// Course id
    pub fn id(&self) -> &CourseId {
        &self.course.id
    }

    /// Whether `lecture` has been completed.
    pub fn has_completed(&self, lecture: &LectureId) -> bool {
        self.completed_lectures.contains(lecture)
    }

    /// Whether every lecture has been completed.
    pub fn is_complete(&self) -> bool {
        self.progress == 100
    }

    /// Normalised hour count of the snapshot.
    pub fn hours(&self) -> Decimal {
        self.course.duration.hours()
    }

    pub(crate) fn recompute_progress(&mut self) {
        self.progress = progress(self.completed_lectures.len(), self.course.lectures.len());
    }
}

/// `round(100 × completed / max(1, total))`, halves rounded up.
pub fn progress(completed: usize, total: usize) -> u8 {
    let percent = Decimal::from(completed) * Decimal::ONE_HUNDRED / Decimal::from(total.max(1));

    percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .min(Decimal::ONE_HUNDRED)
        .to_u8()
        .unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_to_whole_percent() {
        assert_eq!(progress(0, 5), 0);
        assert_eq!(progress(2, 5), 40);
        assert_eq!(progress(5, 5), 100);
        assert_eq!(progress(1, 3), 33);
        assert_eq!(progress(2, 3), 67);
        assert_eq!(progress(1, 8), 13);
    }

    #[test]
    fn progress_without_lectures_does_not_divide_by_zero() {
        assert_eq!(progress(0, 0), 0);
    }
}
