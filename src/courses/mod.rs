//! Courses
//!
//! Catalog records and the value types they are built from. A [`Course`] is
//! immutable from the point of view of the cart and enrollment flows: both take
//! their own snapshot, so later catalog edits never reach them.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{CourseId, InstructorId, LectureId};

mod duration;

pub use duration::{CourseDuration, parse_duration_hours};

/// Course difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Beginner
    Beginner,

    /// Intermediate
    Intermediate,

    /// Advanced
    Advanced,

    /// Suitable for every level
    #[serde(rename = "All Levels")]
    AllLevels,
}

impl Level {
    /// Display label, as stored.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::AllLevels => "All Levels",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised level label
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown course level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            "alllevels" | "all" => Ok(Level::AllLevels),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Course instructor reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    /// Instructor identifier
    pub id: InstructorId,

    /// Display name
    pub name: String,
}

/// A single content unit within a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    /// Identifier, unique within the course
    pub id: LectureId,

    /// Lecture title
    pub title: String,

    /// Display duration (e.g. `"18:45"`)
    #[serde(default)]
    pub duration: String,
}

/// Purchasable course record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Instructor reference
    pub instructor: Instructor,

    /// Price in the catalog currency
    pub price: Decimal,

    /// Pre-discount price, never below `price`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,

    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail: String,

    /// Category name
    #[serde(default)]
    pub category: String,

    /// Difficulty level
    pub level: Level,

    /// Average rating, 0 to 5
    #[serde(default)]
    pub rating: f32,

    /// Number of enrolled students
    #[serde(default)]
    pub students: u64,

    /// Free-form or normalised duration
    #[serde(default)]
    pub duration: CourseDuration,

    /// Ordered lectures
    #[serde(default)]
    pub lectures: Vec<Lecture>,
}

impl Course {
    /// Look up a lecture on this course.
    pub fn lecture(&self, id: &LectureId) -> Option<&Lecture> {
        self.lectures.iter().find(|lecture| &lecture.id == id)
    }

    /// Case-insensitive substring match on title or description.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();

        self.title.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

/// Data for a course created through catalog management.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Instructor reference
    pub instructor: Instructor,

    /// Price
    pub price: Decimal,

    /// Pre-discount price
    pub original_price: Option<Decimal>,

    /// Thumbnail URL
    pub thumbnail: String,

    /// Category
    pub category: String,

    /// Level
    pub level: Level,

    /// Duration
    pub duration: CourseDuration,
}

impl NewCourse {
    /// Build the catalog record, with a fresh id, no students, no rating and no lectures.
    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            title: self.title,
            description: self.description,
            instructor: self.instructor,
            price: self.price,
            original_price: self.original_price,
            thumbnail: self.thumbnail,
            category: self.category,
            level: self.level,
            rating: 0.0,
            students: 0,
            duration: self.duration,
            lectures: Vec::new(),
        }
    }
}

/// Fields to shallow-merge into an existing course. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseUpdate {
    /// Title
    pub title: Option<String>,

    /// Description
    pub description: Option<String>,

    /// Instructor reference
    pub instructor: Option<Instructor>,

    /// Price
    pub price: Option<Decimal>,

    /// Pre-discount price; `Some(None)` clears it
    pub original_price: Option<Option<Decimal>>,

    /// Thumbnail URL
    pub thumbnail: Option<String>,

    /// Category
    pub category: Option<String>,

    /// Level
    pub level: Option<Level>,

    /// Rating
    pub rating: Option<f32>,

    /// Student count
    pub students: Option<u64>,

    /// Duration
    pub duration: Option<CourseDuration>,

    /// Lectures, replaced wholesale
    pub lectures: Option<Vec<Lecture>>,
}

impl CourseUpdate {
    /// Merge the present fields into `course`.
    pub fn apply_to(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(instructor) = self.instructor {
            course.instructor = instructor;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(original_price) = self.original_price {
            course.original_price = original_price;
        }
        if let Some(thumbnail) = self.thumbnail {
            course.thumbnail = thumbnail;
        }
        if let Some(category) = self.category {
            course.category = category;
        }
        if let Some(level) = self.level {
            course.level = level;
        }
        if let Some(rating) = self.rating {
            course.rating = rating;
        }
        if let Some(students) = self.students {
            course.students = students;
        }
        if let Some(duration) = self.duration {
            course.duration = duration;
        }
        if let Some(lectures) = self.lectures {
            course.lectures = lectures;
        }
    }
}


#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::{test_support::course, *};

    #[test]
    fn level_parses_labels_case_insensitively() -> TestResult {
        assert_eq!("beginner".parse::<Level>()?, Level::Beginner);
        assert_eq!("All Levels".parse::<Level>()?, Level::AllLevels);
        assert_eq!("all-levels".parse::<Level>()?, Level::AllLevels);
        assert!("expert".parse::<Level>().is_err());

        Ok(())
    }

    #[test]
    fn level_serializes_with_display_label() -> TestResult {
        assert_eq!(serde_json::to_string(&Level::AllLevels)?, "\"All Levels\"");

        Ok(())
    }

    #[test]
    fn search_matches_title_or_description() {
        let mut web = course("web1", Decimal::new(12999, 2), 1);
        web.title = "React - The Complete Guide".to_string();
        web.description = "Hooks, Redux and Router".to_string();

        assert!(web.matches_search("react"));
        assert!(web.matches_search("REDUX"));
        assert!(!web.matches_search("python"));
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut web = course("web1", Decimal::new(12999, 2), 2);

        CourseUpdate {
            title: Some("Renamed".to_string()),
            price: Some(Decimal::new(9999, 2)),
            ..CourseUpdate::default()
        }
        .apply_to(&mut web);

        assert_eq!(web.title, "Renamed");
        assert_eq!(web.price, Decimal::new(9999, 2));
        assert_eq!(web.lectures.len(), 2);
        assert_eq!(web.category, "Web Development");
    }

    #[test]
    fn new_course_starts_without_students_rating_or_lectures() {
        let template = course("tmp", Decimal::ONE, 3);

        let created = NewCourse {
            title: template.title,
            description: template.description,
            instructor: template.instructor,
            price: template.price,
            original_price: None,
            thumbnail: String::new(),
            category: template.category,
            level: template.level,
            duration: template.duration,
        }
        .into_course(CourseId::from("new1"));

        assert_eq!(created.students, 0);
        assert!(created.rating.abs() < f32::EPSILON);
        assert!(created.lectures.is_empty());
    }

    #[test]
    fn course_json_uses_camel_case_fields() -> TestResult {
        let mut web = course("web1", Decimal::new(12999, 2), 1);
        web.original_price = Some(Decimal::new(19999, 2));

        let json = serde_json::to_value(&web)?;

        assert!(json.get("originalPrice").is_some(), "expected camelCase key");
        assert_eq!(serde_json::from_value::<Course>(json)?, web);

        Ok(())
    }
}
