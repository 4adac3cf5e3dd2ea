use std::{io, sync::Arc};

use clap::{Parser, Subcommand};
use lectern::{checkout::CheckoutProcess, config::Config, context::Storefront};
use tabled::{builder::Builder, settings::Style};

mod account;
mod cart;
mod checkout;
mod courses;
mod learn;

#[derive(Debug, Parser)]
#[command(name = "lectern", about = "Course storefront and learning tracker", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse and manage the course catalog
    Courses(courses::CoursesCommand),

    /// Sign in and out
    Account(account::AccountCommand),

    /// Manage the shopping cart
    Cart(cart::CartCommand),

    /// Pay for the cart and enroll in its courses
    Checkout,

    /// Enrolled courses and lecture progress
    Learn(learn::LearnCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let mut storefront = open_storefront(&self.config)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match self.command {
            Commands::Courses(command) => courses::run(command, &mut storefront, &mut out),
            Commands::Account(command) => account::run(command, &mut storefront, &mut out),
            Commands::Cart(command) => cart::run(command, &mut storefront, &mut out),
            Commands::Checkout => checkout::run(&mut storefront, &mut out).await,
            Commands::Learn(command) => learn::run(command, &mut storefront, &mut out),
        }
    }
}

fn open_storefront(config: &Config) -> Result<Storefront, String> {
    let storage = config
        .storage()
        .map_err(|error| format!("failed to open data directory: {error}"))?;

    let seed = config
        .seed_catalog()
        .map_err(|error| format!("failed to load fixture {}: {error}", config.fixture))?;

    let checkout = CheckoutProcess::new(config.gateway(), config.checkout_options());

    Storefront::open(Arc::new(storage), seed, checkout)
        .map_err(|error| format!("failed to load stored state: {error}"))
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();

    table.with(Style::modern_rounded());

    table.to_string()
}

fn write_err(error: &io::Error) -> String {
    format!("failed to write output: {error}")
}
