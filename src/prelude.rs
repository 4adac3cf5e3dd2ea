//! Lectern prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartItem, CartStore},
    catalog::{
        Catalog, CatalogError, CatalogStore, CourseFilter, CourseLookup,
        fixture::{CatalogFixture, FixtureError, SeedCatalog},
    },
    checkout::{
        CheckoutError, CheckoutOptions, CheckoutProcess, CheckoutReceipt, CoursePolicy,
        PaymentError, PaymentGateway, SimulatedGateway,
    },
    context::{Storefront, StorefrontError},
    courses::{Course, CourseDuration, CourseUpdate, Instructor, Lecture, Level, NewCourse},
    enrollments::{
        EnrollOutcome, EnrolledCourse, EnrollmentError, EnrollmentStore, Enrollments,
        LearningStats,
    },
    ids::{CourseId, InstructorId, LectureId, UserId},
    pricing::{CartSummary, PricingError, VolumeDiscount},
    session::{Identity, Role, Session, SessionError, User},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
};
