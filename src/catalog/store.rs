//! Catalog store

use std::sync::Arc;

use tracing::info;

use crate::{
    catalog::{Catalog, CatalogError, CourseFilter, CourseLookup},
    courses::{Course, CourseUpdate, NewCourse},
    ids::CourseId,
    storage::{KeyValueStore, Persisted, StorageError, WhenEmpty},
};

/// Storage key for the course list.
pub const COURSES_KEY: &str = "courses";

/// A [`Catalog`] that persists every committed change.
///
/// A change that could not be written is discarded.
#[derive(Debug)]
pub struct CatalogStore {
    catalog: Catalog,
    persisted: Persisted<Course>,
}

impl CatalogStore {
    /// Load the stored catalog, falling back to `seed` when nothing usable is
    /// stored. The seed is not written until the first change.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    pub fn open(storage: Arc<dyn KeyValueStore>, seed: Vec<Course>) -> Result<Self, StorageError> {
        let persisted = Persisted::new(storage, COURSES_KEY, WhenEmpty::StoreEmpty);
        let courses = persisted.load()?.unwrap_or(seed);

        Ok(Self {
            catalog: Catalog::new(courses),
            persisted,
        })
    }

    /// Read-only view of the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Courses matching `filter`.
    pub fn list(&self, filter: &CourseFilter) -> Vec<&Course> {
        self.catalog.list(filter)
    }

    /// Exact lookup by id.
    pub fn get(&self, id: &CourseId) -> Option<&Course> {
        self.catalog.get(id)
    }

    /// Add a course and persist the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the course is invalid or the catalog could
    /// not be persisted.
    pub fn add(&mut self, course: NewCourse) -> Result<Course, CatalogError> {
        let mut staged = self.catalog.clone();
        let course = staged.add(course)?;

        self.commit(staged)?;

        info!(course_id = %course.id, title = %course.title, "added course");

        Ok(course)
    }

    /// Merge `update` into a course and persist the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the merged course is invalid or the
    /// catalog could not be persisted.
    pub fn update(&mut self, id: &CourseId, update: CourseUpdate) -> Result<bool, CatalogError> {
        let mut staged = self.catalog.clone();
        let updated = staged.update(id, update)?;

        if updated {
            self.commit(staged)?;
            info!(course_id = %id, "updated course");
        }

        Ok(updated)
    }

    /// Remove a course and persist the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the catalog could not be persisted.
    pub fn remove(&mut self, id: &CourseId) -> Result<Option<Course>, StorageError> {
        let mut staged = self.catalog.clone();
        let removed = staged.remove(id);

        if removed.is_some() {
            self.commit(staged)?;
            info!(course_id = %id, "removed course");
        }

        Ok(removed)
    }

    fn commit(&mut self, staged: Catalog) -> Result<(), StorageError> {
        self.persisted.save(staged.courses())?;
        self.catalog = staged;

        Ok(())
    }
}

impl CourseLookup for CatalogStore {
    fn course(&self, id: &CourseId) -> Option<Course> {
        self.catalog.course(id)
    }
}
