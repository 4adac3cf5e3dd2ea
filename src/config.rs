//! Configuration
//!
//! Settings come from command-line flags, falling back to environment
//! variables (a `.env` file is honoured) and then to defaults.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Args, ValueEnum};

use crate::{
    catalog::fixture::{CatalogFixture, FixtureError, SeedCatalog},
    checkout::{CheckoutOptions, CoursePolicy, PaymentGateway, SimulatedGateway, SimulatedOutcome},
    storage::{FileStore, StorageError},
};

/// Name of the fixture set embedded in the binary.
pub const DEFAULT_FIXTURE: &str = "default";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Single-line human readable
    #[default]
    Compact,

    /// One JSON object per line
    Json,
}

/// Which record checkout enrolls against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Current catalog record, falling back to the cart snapshot
    #[default]
    Catalog,

    /// Snapshot taken when the course was added to the cart
    Snapshot,
}

impl From<PolicyArg> for CoursePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Catalog => CoursePolicy::PreferCatalog,
            PolicyArg::Snapshot => CoursePolicy::CartSnapshot,
        }
    }
}

/// Storefront configuration
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Directory holding persisted state
    #[arg(long, global = true, env = "LECTERN_DATA_DIR", default_value = ".lectern")]
    pub data_dir: PathBuf,

    /// Fixture set used to seed the catalog
    #[arg(short, long, global = true, env = "LECTERN_FIXTURE", default_value = DEFAULT_FIXTURE)]
    pub fixture: String,

    /// Directory containing fixture sets
    #[arg(long, global = true, env = "LECTERN_FIXTURES_PATH", default_value = "./fixtures")]
    pub fixtures_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, global = true, env = "LECTERN_LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,

    /// Simulated payment delay in milliseconds
    #[arg(long, global = true, env = "LECTERN_PAYMENT_DELAY_MS", default_value_t = 1500)]
    pub payment_delay_ms: u64,

    /// Longest to wait for payment, in milliseconds
    #[arg(long, global = true, env = "LECTERN_PAYMENT_TIMEOUT_MS", default_value_t = 30_000)]
    pub payment_timeout_ms: u64,

    /// Make the simulated gateway decline every charge
    #[arg(long, global = true)]
    pub decline: bool,

    /// Course record checkout enrolls against
    #[arg(long, global = true, env = "LECTERN_POLICY", value_enum, default_value_t)]
    pub policy: PolicyArg,
}

impl Config {
    /// Simulated payment delay
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    /// Payment timeout
    pub fn payment_timeout(&self) -> Duration {
        Duration::from_millis(self.payment_timeout_ms)
    }

    /// Checkout options derived from these settings.
    pub fn checkout_options(&self) -> CheckoutOptions {
        CheckoutOptions {
            payment_timeout: self.payment_timeout(),
            policy: self.policy.into(),
            ..CheckoutOptions::default()
        }
    }

    /// The simulated gateway these settings describe.
    pub fn gateway(&self) -> Arc<dyn PaymentGateway> {
        let outcome = if self.decline {
            SimulatedOutcome::Decline
        } else {
            SimulatedOutcome::Approve
        };

        Arc::new(SimulatedGateway::new(self.payment_delay(), outcome))
    }

    /// Load the seed catalog. The default set falls back to the embedded copy
    /// when it is not on disk.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the set cannot be read or is invalid.
    pub fn seed_catalog(&self) -> Result<SeedCatalog, FixtureError> {
        let on_disk = self
            .fixtures_path
            .join("catalog")
            .join(format!("{}.yml", self.fixture));

        if self.fixture == DEFAULT_FIXTURE && !on_disk.exists() {
            return CatalogFixture::default_set();
        }

        CatalogFixture::from_set(&self.fixtures_path, &self.fixture)
    }

    /// Open the data directory.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the directory cannot be created.
    pub fn storage(&self) -> Result<FileStore, StorageError> {
        FileStore::open(&self.data_dir)
    }
}
