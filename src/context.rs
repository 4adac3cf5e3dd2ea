//! Storefront Context

use std::sync::Arc;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    cart::{Cart, CartError, CartItem, CartStore},
    catalog::{CatalogError, CatalogStore, CourseFilter, fixture::SeedCatalog},
    checkout::{CheckoutError, CheckoutProcess, CheckoutReceipt},
    courses::{Course, CourseUpdate, NewCourse},
    enrollments::{EnrollOutcome, EnrolledCourse, EnrollmentError, EnrollmentStore, LearningStats},
    ids::{CourseId, LectureId, UserId},
    pricing::{CartSummary, PricingError},
    session::{Identity, Session, SessionError, User},
    storage::{KeyValueStore, StorageError},
};

/// Errors raised by storefront operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The operation needs a signed-in user.
    #[error("sign in to continue")]
    NotAuthenticated,

    /// No catalog course has this id.
    #[error("no course with id {0}")]
    UnknownCourse(CourseId),

    /// A catalog change was rejected or not persisted.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A cart change was rejected or not persisted.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// An enrollment change was rejected or not persisted.
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),

    /// Checkout did not complete.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The cart summary could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Signing in or out failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The backing store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Signed-in user id, or [`StorefrontError::NotAuthenticated`].
///
/// # Errors
///
/// Returns [`StorefrontError::NotAuthenticated`] when nobody is signed in.
pub fn require_user(identity: &dyn Identity) -> Result<UserId, StorefrontError> {
    if !identity.is_authenticated() {
        return Err(StorefrontError::NotAuthenticated);
    }

    identity
        .current_user_id()
        .ok_or(StorefrontError::NotAuthenticated)
}

/// Every store for one visitor, opened once at start-up and handed to whatever
/// needs it.
#[derive(Debug)]
pub struct Storefront {
    catalog: CatalogStore,
    cart: CartStore,
    enrollments: EnrollmentStore,
    session: Session,
    checkout: CheckoutProcess,
}

impl Storefront {
    /// Open every store on `storage`, seeding the catalog from `seed` when
    /// none is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    pub fn open(
        storage: Arc<dyn KeyValueStore>,
        seed: SeedCatalog,
        checkout: CheckoutProcess,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            catalog: CatalogStore::open(Arc::clone(&storage), seed.courses)?,
            cart: CartStore::open(Arc::clone(&storage), seed.currency)?,
            enrollments: EnrollmentStore::open(Arc::clone(&storage))?,
            session: Session::open(storage)?,
            checkout,
        })
    }

    /// Catalog courses matching `filter`.
    pub fn courses(&self, filter: &CourseFilter) -> Vec<&Course> {
        self.catalog.list(filter)
    }

    /// Catalog course by id.
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.catalog.get(id)
    }

    /// Distinct catalog categories.
    pub fn categories(&self) -> Vec<&str> {
        self.catalog.catalog().categories()
    }

    /// Add a course to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Catalog`] if the course is invalid or
    /// could not be stored.
    pub fn create_course(&mut self, course: NewCourse) -> Result<Course, StorefrontError> {
        Ok(self.catalog.add(course)?)
    }

    /// Merge `update` into a catalog course. Returns `false` for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Catalog`] if the result is invalid or
    /// could not be stored.
    pub fn update_course(
        &mut self,
        id: &CourseId,
        update: CourseUpdate,
    ) -> Result<bool, StorefrontError> {
        Ok(self.catalog.update(id, update)?)
    }

    /// Remove a catalog course. Carts and enrollments keep their snapshots.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Storage`] if the catalog could not be
    /// stored.
    pub fn delete_course(&mut self, id: &CourseId) -> Result<Option<Course>, StorefrontError> {
        Ok(self.catalog.remove(id)?)
    }

    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Session`] for bad credentials.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, StorefrontError> {
        Ok(self.session.login(email, password)?)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Session`] for bad details.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&User, StorefrontError> {
        Ok(self.session.register(name, email, password)?)
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Storage`] if the session could not be
    /// cleared.
    pub fn logout(&mut self) -> Result<(), StorefrontError> {
        Ok(self.session.logout()?)
    }

    /// Current cart.
    pub fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    /// Cart subtotal, discount and total.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Pricing`] if the arithmetic overflowed.
    pub fn cart_summary(&self) -> Result<CartSummary, StorefrontError> {
        Ok(self.cart.summary(&self.checkout.options().discount)?)
    }

    /// Exact undiscounted cart total.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Cart`] if the arithmetic overflowed.
    pub fn cart_total(&self) -> Result<Money<'static, Currency>, StorefrontError> {
        Ok(self.cart.total_price()?)
    }

    /// Add a catalog course to the cart and return the line quantity.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is signed in.
    /// - [`StorefrontError::UnknownCourse`]: `id` is not in the catalog.
    /// - [`StorefrontError::Cart`]: the quantity was rejected or not stored.
    pub fn add_to_cart(&mut self, id: &CourseId, quantity: u32) -> Result<u32, StorefrontError> {
        require_user(&self.session)?;

        let course = self
            .catalog
            .get(id)
            .ok_or_else(|| StorefrontError::UnknownCourse(id.clone()))?;

        Ok(self.cart.add_item(course, quantity)?)
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Cart`] if the cart could not be stored.
    pub fn remove_from_cart(&mut self, id: &CourseId) -> Result<Option<CartItem>, StorefrontError> {
        Ok(self.cart.remove_item(id)?)
    }

    /// Replace a cart line quantity. Returns `false` if there is no such line.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Cart`] if the quantity was rejected or the
    /// cart could not be stored.
    pub fn set_cart_quantity(&mut self, id: &CourseId, quantity: u32) -> Result<bool, StorefrontError> {
        Ok(self.cart.set_quantity(id, quantity)?)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Cart`] if the cart could not be stored.
    pub fn clear_cart(&mut self) -> Result<Vec<CartItem>, StorefrontError> {
        Ok(self.cart.clear()?)
    }

    /// Pay for the cart and enroll in everything in it.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is signed in.
    /// - [`StorefrontError::Checkout`]: see [`CheckoutProcess::run`].
    pub async fn checkout(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<CheckoutReceipt, StorefrontError> {
        require_user(&self.session)?;

        Ok(self
            .checkout
            .run(&mut self.cart, &self.catalog, &mut self.enrollments, cancel)
            .await?)
    }

    /// Enrolled courses.
    pub fn enrollments(&self) -> &[EnrolledCourse] {
        self.enrollments.enrollments().courses()
    }

    /// Enrollment for `id`.
    pub fn enrollment(&self, id: &CourseId) -> Option<&EnrolledCourse> {
        self.enrollments.get(id)
    }

    /// Whether `id` is owned.
    pub fn is_enrolled(&self, id: &CourseId) -> bool {
        self.enrollments.is_enrolled(id)
    }

    /// Enroll directly in a catalog course.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is signed in.
    /// - [`StorefrontError::UnknownCourse`]: `id` is not in the catalog.
    /// - [`StorefrontError::Enrollment`]: the enrollment could not be stored.
    pub fn enroll(&mut self, id: &CourseId) -> Result<EnrollOutcome, StorefrontError> {
        require_user(&self.session)?;

        let course = self
            .catalog
            .get(id)
            .ok_or_else(|| StorefrontError::UnknownCourse(id.clone()))?;

        Ok(self.enrollments.enroll(course)?)
    }

    /// Mark a lecture completed. Returns the new progress, or `None` if the
    /// course is not owned.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::NotAuthenticated`]: nobody is signed in.
    /// - [`StorefrontError::Enrollment`]: unknown lecture, or not stored.
    pub fn complete_lecture(
        &mut self,
        course: &CourseId,
        lecture: &LectureId,
    ) -> Result<Option<u8>, StorefrontError> {
        require_user(&self.session)?;

        Ok(self.enrollments.mark_lecture_completed(course, lecture)?)
    }

    /// Drop an enrollment and its progress.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Enrollment`] if the change could not be
    /// stored.
    pub fn unenroll(&mut self, id: &CourseId) -> Result<Option<EnrolledCourse>, StorefrontError> {
        Ok(self.enrollments.unenroll(id)?)
    }

    /// Learning dashboard figures.
    pub fn stats(&self) -> LearningStats {
        self.enrollments.stats()
    }
}
