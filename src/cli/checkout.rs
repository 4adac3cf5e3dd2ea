use std::{io::Write, time::Instant};

use humanize_duration::{Truncate, prelude::DurationExt};
use lectern::context::Storefront;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::write_err;

pub(crate) async fn run(storefront: &mut Storefront, out: &mut impl Write) -> Result<(), String> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling checkout");
            on_interrupt.cancel();
        }
    });

    writeln!(out, "processing payment (ctrl-c to cancel)...").map_err(|error| write_err(&error))?;
    out.flush().map_err(|error| write_err(&error))?;

    let started = Instant::now();
    let result = storefront.checkout(&cancel).await;
    let elapsed = started.elapsed();

    interrupt.abort();

    let receipt = result.map_err(|error| format!("checkout failed: {error}"))?;

    writeln!(
        out,
        "paid {} (ref {}) in {}\nenrolled in {} new courses, {} already owned",
        receipt.amount(),
        receipt.reference(),
        elapsed.human(Truncate::Nano),
        receipt.enrolled_count(),
        receipt.already_owned_count(),
    )
    .map_err(|error| write_err(&error))
}
