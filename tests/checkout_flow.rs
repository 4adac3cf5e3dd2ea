use std::{path::Path, sync::Arc, time::Duration};

use lectern::prelude::*;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;
use tokio_util::sync::CancellationToken;

fn open(dir: &Path, gateway: SimulatedGateway) -> TestResult<Storefront> {
    let storage = FileStore::open(dir)?;

    Ok(Storefront::open(
        Arc::new(storage),
        CatalogFixture::default_set()?,
        CheckoutProcess::new(Arc::new(gateway), CheckoutOptions::default()),
    )?)
}

#[tokio::test(start_paused = true)]
async fn checkout_enrolls_and_survives_restart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let web = CourseId::from("web1");
    let ds = CourseId::from("ds1");

    {
        let mut storefront = open(dir.path(), SimulatedGateway::default())?;

        storefront.login("ada@example.com", "secret")?;
        storefront.add_to_cart(&web, 1)?;
        storefront.add_to_cart(&ds, 2)?;

        let summary = storefront.cart_summary()?;

        assert_eq!(summary.item_count(), 3);
        assert_eq!(summary.subtotal(), Money::from_decimal(Decimal::new(38_997, 2), USD));
        assert_eq!(summary.discount(), Money::from_decimal(Decimal::new(3_900, 2), USD));

        let receipt = storefront.checkout(&CancellationToken::new()).await?;

        assert_eq!(receipt.amount(), Money::from_decimal(Decimal::new(35_097, 2), USD));
        assert_eq!(receipt.enrolled(), [web.clone(), ds.clone()]);
        assert!(receipt.reference().starts_with("pay_"));
        assert!(storefront.cart().is_empty());
    }

    let mut reopened = open(dir.path(), SimulatedGateway::default())?;

    assert!(reopened.user().is_some(), "session should persist");
    assert!(reopened.cart().is_empty());
    assert!(reopened.is_enrolled(&web));
    assert!(reopened.is_enrolled(&ds));
    assert_eq!(reopened.stats().enrolled, 2);

    let progress = reopened.complete_lecture(&web, &LectureId::from("web1-1"))?;

    assert_eq!(progress, Some(20));

    let again = open(dir.path(), SimulatedGateway::default())?;
    let enrolled = again.enrollment(&web).ok_or("web1 should be enrolled")?;

    assert_eq!(enrolled.progress, 20);
    assert!(enrolled.has_completed(&LectureId::from("web1-1")));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn declined_payment_keeps_the_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let web = CourseId::from("web1");

    let mut storefront = open(dir.path(), SimulatedGateway::declining(Duration::from_millis(1500)))?;

    storefront.login("ada@example.com", "secret")?;
    storefront.add_to_cart(&web, 1)?;

    let result = storefront.checkout(&CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(StorefrontError::Checkout(CheckoutError::Payment(PaymentError::Declined(_))))
    ));
    assert!(!storefront.is_enrolled(&web));

    let reopened = open(dir.path(), SimulatedGateway::default())?;

    assert!(reopened.cart().contains(&web), "cart should still hold web1");
    assert!(reopened.enrollments().is_empty());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancelled_checkout_changes_nothing() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ds = CourseId::from("ds1");

    let mut storefront = open(dir.path(), SimulatedGateway::default())?;

    storefront.login("ada@example.com", "secret")?;
    storefront.add_to_cart(&ds, 1)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = storefront.checkout(&cancel).await;

    assert!(matches!(
        result,
        Err(StorefrontError::Checkout(CheckoutError::Cancelled))
    ));
    assert!(storefront.cart().contains(&ds));
    assert!(!storefront.is_enrolled(&ds));

    Ok(())
}
