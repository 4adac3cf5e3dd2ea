//! Catalog
//!
//! The authoritative course list for a session. [`Catalog`] holds the pure
//! state transitions; [`CatalogStore`] persists each committed change.

use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    courses::{Course, CourseUpdate, NewCourse},
    ids::CourseId,
    storage::StorageError,
};

mod filter;
pub mod fixture;
mod store;

pub use filter::CourseFilter;
pub use store::CatalogStore;

/// Errors raised by catalog management.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Prices cannot be negative.
    #[error("price {0} is negative")]
    NegativePrice(Decimal),

    /// The pre-discount price is below the selling price.
    #[error("original price {original} is below price {price}")]
    OriginalPriceBelowPrice {
        /// Selling price
        price: Decimal,

        /// Pre-discount price
        original: Decimal,
    },

    /// Ratings run from 0 to 5.
    #[error("rating {0} is outside 0..=5")]
    InvalidRating(f32),

    /// The catalog could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Catalog lookup used by checkout to refresh cart snapshots.
#[automock]
pub trait CourseLookup {
    /// Current catalog record for `id`, if it still exists.
    fn course(&self, id: &CourseId) -> Option<Course>;
}

/// In-memory course collection.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Create a catalog from existing records.
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// Every course, in catalog order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Courses matching `filter`, in catalog order.
    pub fn list(&self, filter: &CourseFilter) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|course| filter.matches(course))
            .collect()
    }

    /// Exact lookup by id.
    pub fn get(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|course| &course.id == id)
    }

    /// Distinct categories, in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();

        for course in &self.courses {
            if !categories.contains(&course.category.as_str()) {
                categories.push(&course.category);
            }
        }

        categories
    }

    /// Append a new course with a generated id.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the prices are invalid.
    pub fn add(&mut self, course: NewCourse) -> Result<Course, CatalogError> {
        let course = course.into_course(CourseId::generate());

        validate(&course)?;

        self.courses.push(course.clone());

        Ok(course)
    }

    /// Shallow-merge `update` into the course with `id`.
    ///
    /// Returns `false` if no such course exists.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the merged record is invalid; the stored
    /// record is left unchanged.
    pub fn update(&mut self, id: &CourseId, update: CourseUpdate) -> Result<bool, CatalogError> {
        let Some(existing) = self.courses.iter_mut().find(|course| &course.id == id) else {
            debug!(course_id = %id, "update ignored, course not found");
            return Ok(false);
        };

        let mut merged = existing.clone();
        update.apply_to(&mut merged);

        validate(&merged)?;

        *existing = merged;

        Ok(true)
    }

    /// Delete the course with `id`, returning it. Cart and enrollment
    /// snapshots keep their own copy.
    pub fn remove(&mut self, id: &CourseId) -> Option<Course> {
        let index = self.courses.iter().position(|course| &course.id == id)?;

        Some(self.courses.remove(index))
    }
}

impl CourseLookup for Catalog {
    fn course(&self, id: &CourseId) -> Option<Course> {
        self.get(id).cloned()
    }
}

fn validate(course: &Course) -> Result<(), CatalogError> {
    if course.price < Decimal::ZERO {
        return Err(CatalogError::NegativePrice(course.price));
    }

    if let Some(original) = course
        .original_price
        .filter(|original| *original < course.price)
    {
        return Err(CatalogError::OriginalPriceBelowPrice {
            price: course.price,
            original,
        });
    }

    if !(0.0..=5.0).contains(&course.rating) {
        return Err(CatalogError::InvalidRating(course.rating));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::courses::{CourseDuration, Level, test_support::course};

    use super::*;

    fn catalog() -> Catalog {
        let mut design = course("design1", Decimal::new(8999, 2), 5);
        design.category = "Design".to_string();
        design.title = "UI/UX Design Bootcamp".to_string();

        Catalog::new(vec![
            course("web1", Decimal::new(12999, 2), 5),
            course("web2", Decimal::new(9499, 2), 4),
            design,
        ])
    }

    fn new_course(price: Decimal) -> NewCourse {
        let template = course("tmp", price, 0);

        NewCourse {
            title: "Rust for Beginners".to_string(),
            description: template.description,
            instructor: template.instructor,
            price,
            original_price: None,
            thumbnail: String::new(),
            category: "IT & Software".to_string(),
            level: Level::Beginner,
            duration: CourseDuration::from("12 hours"),
        }
    }

    #[test]
    fn get_returns_exact_match() {
        let catalog = catalog();

        assert_eq!(
            catalog.get(&CourseId::from("web2")).map(|c| c.price),
            Some(Decimal::new(9499, 2))
        );
        assert!(catalog.get(&CourseId::from("web")).is_none());
    }

    #[test]
    fn list_applies_filter() {
        let catalog = catalog();

        let design = catalog.list(&CourseFilter::all().category("Design"));
        let search = catalog.list(&CourseFilter::all().search("bootcamp"));

        assert_eq!(design.len(), 1);
        assert_eq!(search.len(), 1);
        assert_eq!(catalog.list(&CourseFilter::all()).len(), 3);
    }

    #[test]
    fn categories_are_distinct() {
        assert_eq!(catalog().categories(), vec!["Web Development", "Design"]);
    }

    #[test]
    fn add_assigns_fresh_id_and_appends() -> TestResult {
        let mut catalog = catalog();

        let created = catalog.add(new_course(Decimal::new(4999, 2)))?;

        assert_eq!(catalog.courses().len(), 4);
        assert_eq!(catalog.get(&created.id), Some(&created));
        assert_eq!(created.students, 0);
        assert!(created.lectures.is_empty());

        Ok(())
    }

    #[test]
    fn add_rejects_negative_price() {
        let mut catalog = catalog();

        let result = catalog.add(new_course(Decimal::new(-1, 0)));

        assert!(matches!(result, Err(CatalogError::NegativePrice(_))));
        assert_eq!(catalog.courses().len(), 3);
    }

    #[test]
    fn update_missing_course_is_a_no_op() -> TestResult {
        let mut catalog = catalog();

        assert!(!catalog.update(&CourseId::from("nope"), CourseUpdate::default())?);

        Ok(())
    }

    #[test]
    fn invalid_update_leaves_record_unchanged() {
        let mut catalog = catalog();
        let id = CourseId::from("web1");

        let result = catalog.update(
            &id,
            CourseUpdate {
                original_price: Some(Some(Decimal::ONE)),
                ..CourseUpdate::default()
            },
        );

        assert!(matches!(
            result,
            Err(CatalogError::OriginalPriceBelowPrice { .. })
        ));
        assert_eq!(catalog.get(&id).and_then(|c| c.original_price), None);
    }

    #[test]
    fn remove_returns_deleted_course() {
        let mut catalog = catalog();

        let removed = catalog.remove(&CourseId::from("web1"));

        assert_eq!(removed.map(|c| c.id), Some(CourseId::from("web1")));
        assert!(catalog.remove(&CourseId::from("web1")).is_none());
    }
}
