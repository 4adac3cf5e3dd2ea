//! Enrollment errors.

use thiserror::Error;

use crate::{
    ids::{CourseId, LectureId},
    storage::StorageError,
};

/// Errors raised by enrollment operations.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("lecture {lecture} is not part of course {course}")]
    UnknownLecture { course: CourseId, lecture: LectureId },

    #[error("failed to persist enrollments")]
    Storage(#[from] StorageError),
}
