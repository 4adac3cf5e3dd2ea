//! Enrollments
//!
//! What a visitor owns and how far through it they are. [`Enrollments`] holds
//! the pure transitions; [`EnrollmentStore`] persists each committed change.
//! Progress is always derived from the completed lectures, never set.

use jiff::Timestamp;
use tracing::debug;

use crate::{
    courses::Course,
    ids::{CourseId, LectureId},
};

pub mod errors;
pub mod models;
mod stats;
mod store;

pub use errors::EnrollmentError;
pub use models::{CompletedLectures, EnrolledCourse, progress};
pub use stats::LearningStats;
pub use store::{ENROLLMENTS_KEY, EnrollmentStore};

/// Result of an enroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// A new enrollment was recorded.
    Created,

    /// The course was already owned; nothing changed.
    AlreadyEnrolled,
}

impl EnrollOutcome {
    /// Whether a new enrollment was recorded.
    pub fn created(self) -> bool {
        matches!(self, EnrollOutcome::Created)
    }
}

/// The visitor's enrolled courses, at most one per course id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrollments {
    courses: Vec<EnrolledCourse>,
}

impl Enrollments {
    /// Create from previously stored enrollments.
    pub fn new(courses: Vec<EnrolledCourse>) -> Self {
        Self { courses }
    }

    /// Enrolled courses in enrollment order.
    pub fn courses(&self) -> &[EnrolledCourse] {
        &self.courses
    }

    /// Number of enrolled courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether nothing is enrolled.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Whether `id` is enrolled.
    pub fn is_enrolled(&self, id: &CourseId) -> bool {
        self.get(id).is_some()
    }

    /// Enrollment for `id`, if any.
    pub fn get(&self, id: &CourseId) -> Option<&EnrolledCourse> {
        self.courses.iter().find(|enrolled| enrolled.id() == id)
    }

    /// Enroll in `course`. Enrolling in an owned course changes nothing.
    pub fn enroll(&mut self, course: &Course, now: Timestamp) -> EnrollOutcome {
        if self.is_enrolled(&course.id) {
            debug!(course_id = %course.id, "already enrolled");
            return EnrollOutcome::AlreadyEnrolled;
        }

        self.courses.push(EnrolledCourse::new(course, now));

        EnrollOutcome::Created
    }

    /// Record `lecture` as completed on `course` and return the new progress.
    ///
    /// Returns `Ok(None)` if the course is not enrolled. Completing a lecture
    /// twice is harmless; `last_accessed` is refreshed either way.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::UnknownLecture`] if the lecture is not on
    /// the enrolled snapshot; nothing changes.
    pub fn mark_lecture_completed(
        &mut self,
        course: &CourseId,
        lecture: &LectureId,
        now: Timestamp,
    ) -> Result<Option<u8>, EnrollmentError> {
        let Some(enrolled) = self.courses.iter_mut().find(|enrolled| enrolled.id() == course)
        else {
            debug!(course_id = %course, "lecture completion ignored, not enrolled");
            return Ok(None);
        };

        if enrolled.course.lecture(lecture).is_none() {
            return Err(EnrollmentError::UnknownLecture {
                course: course.clone(),
                lecture: lecture.clone(),
            });
        }

        if !enrolled.has_completed(lecture) {
            enrolled.completed_lectures.push(lecture.clone());
        }

        enrolled.recompute_progress();
        enrolled.last_accessed = now;

        Ok(Some(enrolled.progress))
    }

    /// Remove the enrollment for `id`, progress included, returning it.
    pub fn unenroll(&mut self, id: &CourseId) -> Option<EnrolledCourse> {
        let index = self.courses.iter().position(|enrolled| enrolled.id() == id)?;

        Some(self.courses.remove(index))
    }

    /// Dashboard figures over every enrollment.
    pub fn stats(&self) -> LearningStats {
        LearningStats::from_enrollments(&self.courses)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::courses::{CourseDuration, test_support::course};

    use super::*;

    fn lecture(course: &str, n: usize) -> LectureId {
        LectureId::from(format!("{course}-{n}"))
    }

    #[test]
    fn enroll_snapshots_with_zero_progress() {
        let mut enrollments = Enrollments::default();
        let now = Timestamp::now();

        let outcome = enrollments.enroll(&course("web1", Decimal::ONE, 5), now);

        assert_eq!(outcome, EnrollOutcome::Created);

        let enrolled = enrollments.get(&CourseId::from("web1"));

        assert_eq!(enrolled.map(|e| e.progress), Some(0));
        assert_eq!(enrolled.map(|e| e.completed_lectures.len()), Some(0));
        assert_eq!(enrolled.map(|e| e.enrolled_at), Some(now));
        assert_eq!(enrolled.map(|e| e.last_accessed), Some(now));
    }

    #[test]
    fn enroll_normalises_duration() {
        let mut enrollments = Enrollments::default();

        enrollments.enroll(&course("web1", Decimal::ONE, 5), Timestamp::now());

        assert_eq!(
            enrollments.get(&CourseId::from("web1")).map(|e| e.course.duration.clone()),
            Some(CourseDuration::Hours(Decimal::new(525, 1)))
        );
    }

    #[test]
    fn second_enroll_is_a_no_op() -> TestResult {
        let mut enrollments = Enrollments::default();
        let web = course("web1", Decimal::ONE, 5);
        let first = Timestamp::from_second(1_700_000_000)?;

        enrollments.enroll(&web, first);
        let outcome = enrollments.enroll(&web, Timestamp::now());

        assert_eq!(outcome, EnrollOutcome::AlreadyEnrolled);
        assert!(!outcome.created());
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments.get(&web.id).map(|e| e.enrolled_at), Some(first));

        Ok(())
    }

    #[test]
    fn progress_follows_completed_lectures() -> TestResult {
        let mut enrollments = Enrollments::default();
        let web = course("web1", Decimal::ONE, 5);

        enrollments.enroll(&web, Timestamp::now());

        enrollments.mark_lecture_completed(&web.id, &lecture("web1", 1), Timestamp::now())?;
        let two = enrollments.mark_lecture_completed(&web.id, &lecture("web1", 2), Timestamp::now())?;

        assert_eq!(two, Some(40));

        for n in 3..=5 {
            enrollments.mark_lecture_completed(&web.id, &lecture("web1", n), Timestamp::now())?;
        }

        let enrolled = enrollments.get(&web.id).ok_or("not enrolled")?;

        assert_eq!(enrolled.progress, 100);
        assert!(enrolled.is_complete());

        Ok(())
    }

    #[test]
    fn completing_a_lecture_twice_is_idempotent() -> TestResult {
        let mut enrollments = Enrollments::default();
        let web = course("web1", Decimal::ONE, 5);
        let first = lecture("web1", 1);

        enrollments.enroll(&web, Timestamp::now());
        enrollments.mark_lecture_completed(&web.id, &first, Timestamp::now())?;
        let once = enrollments.get(&web.id).cloned().ok_or("not enrolled")?;

        enrollments.mark_lecture_completed(&web.id, &first, Timestamp::now())?;
        let twice = enrollments.get(&web.id).ok_or("not enrolled")?;

        assert_eq!(twice.completed_lectures, once.completed_lectures);
        assert_eq!(twice.progress, once.progress);
        assert_eq!(twice.progress, 20);

        Ok(())
    }

    #[test]
    fn completion_refreshes_last_accessed() -> TestResult {
        let mut enrollments = Enrollments::default();
        let web = course("web1", Decimal::ONE, 5);
        let enrolled_at = Timestamp::from_second(1_700_000_000)?;
        let later = Timestamp::from_second(1_700_086_400)?;

        enrollments.enroll(&web, enrolled_at);
        enrollments.mark_lecture_completed(&web.id, &lecture("web1", 1), later)?;

        let enrolled = enrollments.get(&web.id).ok_or("not enrolled")?;

        assert_eq!(enrolled.enrolled_at, enrolled_at);
        assert_eq!(enrolled.last_accessed, later);

        Ok(())
    }

    #[test]
    fn completion_on_unowned_course_is_ignored() -> TestResult {
        let mut enrollments = Enrollments::default();

        let progress = enrollments.mark_lecture_completed(
            &CourseId::from("web1"),
            &lecture("web1", 1),
            Timestamp::now(),
        )?;

        assert_eq!(progress, None);
        assert!(enrollments.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_lecture_is_rejected() {
        let mut enrollments = Enrollments::default();
        let web = course("web1", Decimal::ONE, 2);

        enrollments.enroll(&web, Timestamp::now());

        let result =
            enrollments.mark_lecture_completed(&web.id, &lecture("ds1", 1), Timestamp::now());

        assert!(matches!(result, Err(EnrollmentError::UnknownLecture { .. })));
        assert_eq!(enrollments.get(&web.id).map(|e| e.progress), Some(0));
    }

    #[test]
    fn course_without_lectures_stays_at_zero() {
        let mut enrollments = Enrollments::default();
        let empty = course("empty", Decimal::ONE, 0);

        enrollments.enroll(&empty, Timestamp::now());

        assert_eq!(enrollments.get(&empty.id).map(|e| e.progress), Some(0));
    }

    #[test]
    fn unenroll_returns_and_forgets_the_record() -> TestResult {
        let mut enrollments = Enrollments::default();
        let web = course("web1", Decimal::ONE, 5);

        enrollments.enroll(&web, Timestamp::now());
        enrollments.mark_lecture_completed(&web.id, &lecture("web1", 1), Timestamp::now())?;

        let removed = enrollments.unenroll(&web.id).ok_or("nothing removed")?;

        assert_eq!(removed.progress, 20);
        assert!(!enrollments.is_enrolled(&web.id));
        assert!(enrollments.unenroll(&web.id).is_none());

        enrollments.enroll(&web, Timestamp::now());
        assert_eq!(enrollments.get(&web.id).map(|e| e.progress), Some(0));

        Ok(())
    }
}
