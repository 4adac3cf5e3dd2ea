//! Enrollment store

use std::sync::Arc;

use jiff::Timestamp;
use tracing::info;

use crate::{
    courses::Course,
    enrollments::{EnrollOutcome, EnrolledCourse, EnrollmentError, Enrollments, LearningStats},
    ids::{CourseId, LectureId},
    storage::{KeyValueStore, Persisted, StorageError, WhenEmpty},
};

/// Storage key for enrollments. Absent means none.
pub const ENROLLMENTS_KEY: &str = "enrolledCourses";

/// [`Enrollments`] written out after every committed change.
///
/// A change is only kept once it has been written.
#[derive(Debug)]
pub struct EnrollmentStore {
    enrollments: Enrollments,
    persisted: Persisted<EnrolledCourse>,
}

impl EnrollmentStore {
    /// Load stored enrollments; a missing or corrupt value starts empty.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let persisted = Persisted::new(storage, ENROLLMENTS_KEY, WhenEmpty::StoreEmpty);
        let courses = persisted.load()?.unwrap_or_default();

        Ok(Self {
            enrollments: Enrollments::new(courses),
            persisted,
        })
    }

    /// Current enrollment state.
    pub fn enrollments(&self) -> &Enrollments {
        &self.enrollments
    }

    /// Whether `id` is enrolled.
    pub fn is_enrolled(&self, id: &CourseId) -> bool {
        self.enrollments.is_enrolled(id)
    }

    /// Enrollment for `id`, if any.
    pub fn get(&self, id: &CourseId) -> Option<&EnrolledCourse> {
        self.enrollments.get(id)
    }

    /// Dashboard figures.
    pub fn stats(&self) -> LearningStats {
        self.enrollments.stats()
    }

    /// Enroll in `course`, persisting if a record was created.
    ///
    /// # Errors
    ///
    /// Returns an [`EnrollmentError`] if the enrollments could not be
    /// persisted.
    pub fn enroll(&mut self, course: &Course) -> Result<EnrollOutcome, EnrollmentError> {
        let mut staged = self.enrollments.clone();
        let outcome = staged.enroll(course, Timestamp::now());

        if outcome.created() {
            self.commit(staged)?;
            info!(course_id = %course.id, title = %course.title, "enrolled");
        }

        Ok(outcome)
    }

    /// Mark a lecture completed and persist the new progress.
    ///
    /// # Errors
    ///
    /// Returns an [`EnrollmentError`] if the lecture is unknown or the
    /// enrollments could not be persisted.
    pub fn mark_lecture_completed(
        &mut self,
        course: &CourseId,
        lecture: &LectureId,
    ) -> Result<Option<u8>, EnrollmentError> {
        let mut staged = self.enrollments.clone();
        let progress = staged.mark_lecture_completed(course, lecture, Timestamp::now())?;

        if let Some(progress) = progress {
            self.commit(staged)?;
            info!(course_id = %course, lecture_id = %lecture, progress, "lecture completed");
        }

        Ok(progress)
    }

    /// Remove an enrollment and persist.
    ///
    /// # Errors
    ///
    /// Returns an [`EnrollmentError`] if the enrollments could not be
    /// persisted.
    pub fn unenroll(&mut self, id: &CourseId) -> Result<Option<EnrolledCourse>, EnrollmentError> {
        let mut staged = self.enrollments.clone();
        let removed = staged.unenroll(id);

        if removed.is_some() {
            self.commit(staged)?;
            info!(course_id = %id, "unenrolled");
        }

        Ok(removed)
    }

    fn commit(&mut self, staged: Enrollments) -> Result<(), StorageError> {
        self.persisted.save(staged.courses())?;
        self.enrollments = staged;

        Ok(())
    }
}
