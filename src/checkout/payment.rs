//! Payment
//!
//! Charging is the one step of checkout that can fail or stall. It sits behind
//! [`PaymentGateway`] so tests and the command line can swap the simulated
//! gateway for one that declines or never answers.

use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::ids::CourseId;

/// Errors returned by a payment gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The charge was refused.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The gateway could not be reached.
    #[error("payment gateway unavailable")]
    Unavailable,
}

/// A charge to make.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Amount to charge
    pub amount: Money<'static, Currency>,

    /// Courses being paid for
    pub courses: Vec<CourseId>,
}

/// Proof of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    /// Gateway reference for the charge
    pub reference: String,

    /// When the charge was accepted
    pub charged_at: Timestamp,
}

impl PaymentConfirmation {
    /// A confirmation with a freshly generated reference.
    pub fn generate() -> Self {
        Self {
            reference: format!("pay_{}", Uuid::now_v7().simple()),
            charged_at: Timestamp::now(),
        }
    }
}

/// Takes payment for a checkout.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `request.amount`.
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentConfirmation, PaymentError>;
}

/// How the simulated gateway answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimulatedOutcome {
    /// Accept every charge.
    #[default]
    Approve,

    /// Refuse every charge.
    Decline,
}

/// A gateway that waits, then approves or declines.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
    outcome: SimulatedOutcome,
}

impl SimulatedGateway {
    /// Answer with `outcome` after `delay`.
    pub fn new(delay: Duration, outcome: SimulatedOutcome) -> Self {
        Self { delay, outcome }
    }

    /// Approve after `delay`.
    pub fn approving(delay: Duration) -> Self {
        Self::new(delay, SimulatedOutcome::Approve)
    }

    /// Decline after `delay`.
    pub fn declining(delay: Duration) -> Self {
        Self::new(delay, SimulatedOutcome::Decline)
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::approving(Duration::from_millis(1500))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentConfirmation, PaymentError> {
        debug!(amount = %request.amount, delay = ?self.delay, "simulating payment");

        tokio::time::sleep(self.delay).await;

        match self.outcome {
            SimulatedOutcome::Approve => Ok(PaymentConfirmation::generate()),
            SimulatedOutcome::Decline => Err(PaymentError::Declined("card declined".to_string())),
        }
    }
}
