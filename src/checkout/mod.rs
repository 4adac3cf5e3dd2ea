//! Checkout
//!
//! Turns cart intent into enrollments: charge the cart total, enroll in each
//! line's course, then empty the cart. Until the charge is confirmed nothing
//! is written, so a declined, timed out or cancelled payment leaves the cart
//! and enrollments exactly as they were.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{Span, info, warn};

use crate::{
    cart::{CartItem, CartStore},
    catalog::CourseLookup,
    courses::Course,
    enrollments::EnrollmentStore,
    pricing::VolumeDiscount,
};

pub mod errors;
mod payment;
mod receipt;

pub use errors::CheckoutError;
pub use payment::{
    MockPaymentGateway, PaymentConfirmation, PaymentError, PaymentGateway, PaymentRequest,
    SimulatedGateway, SimulatedOutcome,
};
pub use receipt::CheckoutReceipt;

/// Which course record a cart line is enrolled against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoursePolicy {
    /// The current catalog record, or the cart snapshot if the course has
    /// since left the catalog.
    #[default]
    PreferCatalog,

    /// Always the snapshot taken when the line was added.
    CartSnapshot,
}

impl CoursePolicy {
    /// The course to enroll `item` against.
    pub fn resolve(self, item: &CartItem, catalog: &dyn CourseLookup) -> Course {
        match self {
            CoursePolicy::PreferCatalog => catalog
                .course(item.id())
                .unwrap_or_else(|| item.course.clone()),
            CoursePolicy::CartSnapshot => item.course.clone(),
        }
    }
}

/// Checkout tuning.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutOptions {
    /// Longest to wait for the gateway
    pub payment_timeout: Duration,

    /// Course resolution policy
    pub policy: CoursePolicy,

    /// Discount applied to the amount charged
    pub discount: VolumeDiscount,
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        Self {
            payment_timeout: Duration::from_secs(30),
            policy: CoursePolicy::default(),
            discount: VolumeDiscount::default(),
        }
    }
}

/// Runs checkouts against a payment gateway.
#[derive(Clone)]
pub struct CheckoutProcess {
    gateway: Arc<dyn PaymentGateway>,
    options: CheckoutOptions,
}

impl std::fmt::Debug for CheckoutProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutProcess")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CheckoutProcess {
    /// Checkout through `gateway` with `options`.
    pub fn new(gateway: Arc<dyn PaymentGateway>, options: CheckoutOptions) -> Self {
        Self { gateway, options }
    }

    /// Current options
    pub fn options(&self) -> &CheckoutOptions {
        &self.options
    }

    /// Charge the cart total, enroll every line and clear the cart.
    ///
    /// Lines for courses already owned are tallied in the receipt and change
    /// nothing. The cart is cleared even if every line was already owned.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: nothing to buy.
    /// - [`CheckoutError::Cancelled`]: `cancel` fired before the charge
    ///   completed.
    /// - [`CheckoutError::PaymentTimeout`]: the gateway did not answer in time.
    /// - [`CheckoutError::Payment`]: the gateway refused the charge.
    /// - Pricing, cart, or enrollment errors from the stores.
    #[tracing::instrument(
        name = "checkout.run",
        skip_all,
        fields(
            lines = cart.items().len(),
            amount = tracing::field::Empty,
            reference = tracing::field::Empty,
            enrolled = tracing::field::Empty,
            already_owned = tracing::field::Empty
        ),
        err
    )]
    pub async fn run(
        &self,
        cart: &mut CartStore,
        catalog: &dyn CourseLookup,
        enrollments: &mut EnrollmentStore,
        cancel: &CancellationToken,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if cart.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let span = Span::current();
        let amount = cart.summary(&self.options.discount)?.total();

        span.record("amount", tracing::field::display(amount));

        let request = PaymentRequest {
            amount,
            courses: cart.items().iter().map(|item| item.id().clone()).collect(),
        };

        let confirmation = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                info!("checkout cancelled before payment completed");
                return Err(CheckoutError::Cancelled);
            }

            charged = tokio::time::timeout(self.options.payment_timeout, self.gateway.charge(request)) => {
                match charged {
                    Ok(result) => result?,
                    Err(_elapsed) => {
                        warn!(timeout = ?self.options.payment_timeout, "payment timed out");
                        return Err(CheckoutError::PaymentTimeout(self.options.payment_timeout));
                    }
                }
            }
        };

        span.record("reference", tracing::field::display(&confirmation.reference));

        let mut receipt = CheckoutReceipt::new(amount, confirmation.reference);

        for item in cart.items() {
            let course = self.options.policy.resolve(item, catalog);
            let outcome = enrollments.enroll(&course)?;

            receipt.record(course.id, outcome.created());
        }

        cart.clear()?;

        span.record("enrolled", receipt.enrolled_count());
        span.record("already_owned", receipt.already_owned_count());

        info!(
            amount = %receipt.amount(),
            enrolled = receipt.enrolled_count(),
            already_owned = receipt.already_owned_count(),
            "checkout complete"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        catalog::{Catalog, MockCourseLookup},
        courses::test_support::course,
        ids::{CourseId, LectureId},
        storage::{KeyValueStore, MemoryStore},
    };

    use super::*;

    struct Fixture {
        storage: Arc<MemoryStore>,
        cart: CartStore,
        enrollments: EnrollmentStore,
        catalog: Catalog,
    }

    fn fixture() -> TestResult<Fixture> {
        let storage = Arc::new(MemoryStore::new());

        Ok(Fixture {
            cart: CartStore::open(storage.clone(), USD)?,
            enrollments: EnrollmentStore::open(storage.clone())?,
            catalog: Catalog::new(vec![
                course("web1", Decimal::new(12999, 2), 5),
                course("ds1", Decimal::new(12999, 2), 4),
            ]),
            storage,
        })
    }

    fn fill_cart(fixture: &mut Fixture) -> TestResult {
        for (id, quantity) in [("web1", 1), ("ds1", 2)] {
            let course = fixture
                .catalog
                .get(&CourseId::from(id))
                .cloned()
                .ok_or("missing course")?;

            fixture.cart.add_item(&course, quantity)?;
        }

        Ok(())
    }

    fn approving() -> CheckoutProcess {
        CheckoutProcess::new(
            Arc::new(SimulatedGateway::approving(Duration::from_millis(1500))),
            CheckoutOptions::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_enrolls_every_line_and_clears_cart() -> TestResult {
        let mut fixture = fixture()?;
        fill_cart(&mut fixture)?;

        let receipt = approving()
            .run(
                &mut fixture.cart,
                &fixture.catalog,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await?;

        assert_eq!(receipt.enrolled_count(), 2);
        assert_eq!(receipt.already_owned_count(), 0);
        assert!(fixture.cart.cart().is_empty());
        assert!(fixture.enrollments.is_enrolled(&CourseId::from("web1")));
        assert!(fixture.enrollments.is_enrolled(&CourseId::from("ds1")));
        assert!(fixture.storage.get(crate::cart::CART_KEY)?.is_none());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_charges_discounted_total() -> TestResult {
        let mut fixture = fixture()?;
        fill_cart(&mut fixture)?;

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge()
            .once()
            .withf(|request| {
                request.amount == Money::from_decimal(Decimal::new(35097, 2), USD)
                    && request.courses.len() == 2
            })
            .return_once(|_| Ok(PaymentConfirmation::generate()));

        let receipt = CheckoutProcess::new(Arc::new(gateway), CheckoutOptions::default())
            .run(
                &mut fixture.cart,
                &fixture.catalog,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await?;

        assert_eq!(receipt.amount(), Money::from_decimal(Decimal::new(35097, 2), USD));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn owned_courses_keep_their_progress() -> TestResult {
        let mut fixture = fixture()?;
        let web = CourseId::from("web1");
        let owned = fixture.catalog.get(&web).cloned().ok_or("missing course")?;

        fixture.enrollments.enroll(&owned)?;
        fixture
            .enrollments
            .mark_lecture_completed(&web, &LectureId::from("web1-1"))?;
        let before = fixture.enrollments.get(&web).cloned();

        fill_cart(&mut fixture)?;

        let receipt = approving()
            .run(
                &mut fixture.cart,
                &fixture.catalog,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await?;

        assert_eq!(receipt.enrolled_count(), 1);
        assert_eq!(receipt.already_owned_count(), 1);
        assert_eq!(receipt.already_owned(), &[web.clone()]);
        assert_eq!(fixture.enrollments.get(&web).cloned(), before);
        assert!(fixture.cart.cart().is_empty());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn empty_cart_is_rejected_without_charging() -> TestResult {
        let mut fixture = fixture()?;
        let mut gateway = MockPaymentGateway::new();

        gateway.expect_charge().never();

        let result = CheckoutProcess::new(Arc::new(gateway), CheckoutOptions::default())
            .run(
                &mut fixture.cart,
                &fixture.catalog,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn declined_payment_leaves_everything_untouched() -> TestResult {
        let mut fixture = fixture()?;
        fill_cart(&mut fixture)?;
        let cart_before = fixture.cart.cart().clone();

        let mut gateway = MockPaymentGateway::new();

        gateway
            .expect_charge()
            .once()
            .return_once(|_| Err(PaymentError::Declined("insufficient funds".to_string())));

        let result = CheckoutProcess::new(Arc::new(gateway), CheckoutOptions::default())
            .run(
                &mut fixture.cart,
                &fixture.catalog,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::Payment(PaymentError::Declined(_)))
        ));
        assert_eq!(fixture.cart.cart(), &cart_before);
        assert!(fixture.enrollments.enrollments().is_empty());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn slow_gateway_times_out() -> TestResult {
        let mut fixture = fixture()?;
        fill_cart(&mut fixture)?;

        let process = CheckoutProcess::new(
            Arc::new(SimulatedGateway::approving(Duration::from_secs(120))),
            CheckoutOptions {
                payment_timeout: Duration::from_secs(30),
                ..CheckoutOptions::default()
            },
        );

        let result = process
            .run(
                &mut fixture.cart,
                &fixture.catalog,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(CheckoutError::PaymentTimeout(_))));
        assert_eq!(fixture.cart.total_item_count(), 3);
        assert!(fixture.enrollments.enrollments().is_empty());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_mid_payment_abandons_checkout() -> TestResult {
        let mut fixture = fixture()?;
        fill_cart(&mut fixture)?;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result = approving()
            .run(
                &mut fixture.cart,
                &fixture.catalog,
                &mut fixture.enrollments,
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(CheckoutError::Cancelled)));
        assert_eq!(fixture.cart.total_item_count(), 3);
        assert!(fixture.enrollments.enrollments().is_empty());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn prefer_catalog_enrolls_against_fresh_lectures() -> TestResult {
        let mut fixture = fixture()?;
        fill_cart(&mut fixture)?;

        let web = CourseId::from("web1");
        let mut lookup = MockCourseLookup::new();

        lookup
            .expect_course()
            .returning(|id| Some(course(id.as_str(), Decimal::new(1, 0), 10)));

        approving()
            .run(
                &mut fixture.cart,
                &lookup,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await?;

        assert_eq!(
            fixture.enrollments.get(&web).map(|e| e.course.lectures.len()),
            Some(10)
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cart_snapshot_policy_ignores_catalog() -> TestResult {
        let mut fixture = fixture()?;
        fill_cart(&mut fixture)?;

        let web = CourseId::from("web1");
        let mut lookup = MockCourseLookup::new();

        lookup.expect_course().never();

        let process = CheckoutProcess::new(
            Arc::new(SimulatedGateway::approving(Duration::from_millis(10))),
            CheckoutOptions {
                policy: CoursePolicy::CartSnapshot,
                ..CheckoutOptions::default()
            },
        );

        process
            .run(
                &mut fixture.cart,
                &lookup,
                &mut fixture.enrollments,
                &CancellationToken::new(),
            )
            .await?;

        assert_eq!(
            fixture.enrollments.get(&web).map(|e| e.course.lectures.len()),
            Some(5)
        );

        Ok(())
    }

    #[test]
    fn removed_course_falls_back_to_snapshot() {
        let snapshot = course("gone", Decimal::ONE, 2);
        let item = CartItem::new(snapshot.clone(), 1, jiff::Timestamp::now());

        let resolved = CoursePolicy::PreferCatalog.resolve(&item, &Catalog::default());

        assert_eq!(resolved, snapshot);
    }
}
