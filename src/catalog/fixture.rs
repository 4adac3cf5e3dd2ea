//! Catalog fixtures
//!
//! Seed catalogs are YAML files under `<base>/catalog/<set>.yml`. The default
//! set is compiled in so a fresh session always has something to browse.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    courses::{Course, CourseDuration, Instructor, Lecture, Level},
    ids::CourseId,
};

const DEFAULT_CATALOG: &str = include_str!("../../fixtures/catalog/default.yml");

/// Fixture parsing errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between courses
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// The same course id appears twice
    #[error("Duplicate course id: {0}")]
    DuplicateCourse(String),

    /// No courses in the fixture
    #[error("Fixture contains no courses; currency unknown")]
    NoCourses,
}

/// Wrapper for courses in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Courses in catalog order
    pub courses: Vec<CourseFixture>,
}

/// Course fixture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFixture {
    /// Course id
    pub id: String,

    /// Title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Instructor
    pub instructor: Instructor,

    /// Price (e.g., "129.99 USD")
    pub price: String,

    /// Pre-discount price, same format as `price`
    #[serde(default)]
    pub original_price: Option<String>,

    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail: String,

    /// Category
    pub category: String,

    /// Level
    pub level: Level,

    /// Rating
    #[serde(default)]
    pub rating: f32,

    /// Student count
    #[serde(default)]
    pub students: u64,

    /// Free-form duration
    #[serde(default)]
    pub duration: String,

    /// Lectures
    #[serde(default)]
    pub lectures: Vec<Lecture>,
}

/// Courses loaded from a fixture, with the currency they are priced in.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    /// Courses in fixture order
    pub courses: Vec<Course>,

    /// Currency shared by every price
    pub currency: &'static Currency,
}

impl CatalogFixture {
    /// The built-in default catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the embedded fixture is malformed.
    pub fn default_set() -> Result<SeedCatalog, FixtureError> {
        Self::parse(DEFAULT_CATALOG)?.into_seed()
    }

    /// Load `<base_path>/catalog/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed, or if
    /// its prices are inconsistent.
    pub fn from_set(base_path: impl AsRef<Path>, name: &str) -> Result<SeedCatalog, FixtureError> {
        let file_path = base_path
            .as_ref()
            .join("catalog")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(file_path)?;

        Self::parse(&contents)?.into_seed()
    }

    /// Parse fixture YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError::Yaml`] if the YAML is malformed.
    pub fn parse(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Convert into catalog records, checking that every price shares a
    /// currency and every id is unique.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] on bad prices, mixed currencies, or duplicate ids.
    pub fn into_seed(self) -> Result<SeedCatalog, FixtureError> {
        let mut currency: Option<&'static Currency> = None;
        let mut courses: Vec<Course> = Vec::with_capacity(self.courses.len());

        for fixture in self.courses {
            if courses.iter().any(|course| course.id.as_str() == fixture.id) {
                return Err(FixtureError::DuplicateCourse(fixture.id));
            }

            let (price, price_currency) = parse_price(&fixture.price)?;
            let expected = *currency.get_or_insert(price_currency);

            let original_price = fixture
                .original_price
                .as_deref()
                .map(parse_price)
                .transpose()?;

            for found in std::iter::once(price_currency)
                .chain(original_price.iter().map(|(_, currency)| *currency))
            {
                if found != expected {
                    return Err(FixtureError::CurrencyMismatch(
                        expected.iso_alpha_code.to_string(),
                        found.iso_alpha_code.to_string(),
                    ));
                }
            }

            courses.push(Course {
                id: CourseId::new(fixture.id),
                title: fixture.title,
                description: fixture.description,
                instructor: fixture.instructor,
                price,
                original_price: original_price.map(|(amount, _)| amount),
                thumbnail: fixture.thumbnail,
                category: fixture.category,
                level: fixture.level,
                rating: fixture.rating,
                students: fixture.students,
                duration: CourseDuration::Label(fixture.duration),
                lectures: fixture.lectures,
            });
        }

        let currency = currency.ok_or(FixtureError::NoCourses)?;

        Ok(SeedCatalog { courses, currency })
    }
}

/// Parse price string (e.g., "129.99 USD") into an amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount < Decimal::ZERO {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((amount, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn default_set_has_the_full_catalog() -> TestResult {
        let seed = CatalogFixture::default_set()?;

        assert_eq!(seed.courses.len(), 12);
        assert_eq!(seed.currency, USD);

        let web1 = seed
            .courses
            .iter()
            .find(|course| course.id.as_str() == "web1")
            .ok_or("web1 missing from default catalog")?;

        assert_eq!(web1.price, Decimal::new(12999, 2));
        assert_eq!(web1.level, Level::AllLevels);
        assert_eq!(web1.lectures.len(), 5);
        assert_eq!(web1.duration.hours(), Decimal::new(525, 1));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        assert!(matches!(
            parse_price("-1.00 USD"),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_keeps_exact_decimal() -> Result<(), FixtureError> {
        let (amount, currency) = parse_price("129.99 GBP")?;

        assert_eq!(amount, Decimal::new(12999, 2));
        assert_eq!(currency, GBP);

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() -> TestResult {
        let fixture = CatalogFixture::parse(
            r"
courses:
  - id: a
    title: A
    instructor: { id: i1, name: One }
    price: 10.00 USD
    category: Design
    level: Beginner
  - id: b
    title: B
    instructor: { id: i1, name: One }
    price: 10.00 GBP
    category: Design
    level: Beginner
",
        )?;

        let result = fixture.into_seed();

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "USD" && found == "GBP"
        ));

        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() -> TestResult {
        let fixture = CatalogFixture::parse(
            r"
courses:
  - id: a
    title: A
    instructor: { id: i1, name: One }
    price: 10.00 USD
    category: Design
    level: Beginner
  - id: a
    title: A again
    instructor: { id: i1, name: One }
    price: 12.00 USD
    category: Design
    level: Beginner
",
        )?;

        assert!(matches!(
            fixture.into_seed(),
            Err(FixtureError::DuplicateCourse(id)) if id == "a"
        ));

        Ok(())
    }

    #[test]
    fn empty_fixture_has_no_currency() -> TestResult {
        let fixture = CatalogFixture::parse("courses: []")?;

        assert!(matches!(fixture.into_seed(), Err(FixtureError::NoCourses)));

        Ok(())
    }

    #[test]
    fn from_set_reads_named_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("catalog"))?;
        std::fs::write(
            dir.path().join("catalog").join("tiny.yml"),
            "courses:\n  - id: t1\n    title: Tiny\n    instructor: { id: i1, name: One }\n    price: 5.00 EUR\n    category: Music\n    level: All Levels\n    duration: 2h\n",
        )?;

        let seed = CatalogFixture::from_set(dir.path(), "tiny")?;

        assert_eq!(seed.currency, EUR);
        assert_eq!(seed.courses.len(), 1);

        Ok(())
    }
}
