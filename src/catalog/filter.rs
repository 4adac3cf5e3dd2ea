//! Catalog filters

use crate::courses::{Course, Level};

/// Predicate over courses. Every populated criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    /// Exact category
    pub category: Option<String>,

    /// Exact level
    pub level: Option<Level>,

    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

impl CourseFilter {
    /// A filter that matches every course.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to a level.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Restrict to courses whose title or description contains `term`.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Whether `course` satisfies this filter.
    pub fn matches(&self, course: &Course) -> bool {
        let category = self
            .category
            .as_deref()
            .is_none_or(|category| category.is_empty() || course.category == category);

        let level = self.level.is_none_or(|level| course.level == level);

        let search = self
            .search
            .as_deref()
            .is_none_or(|term| course.matches_search(term));

        category && level && search
    }
}
