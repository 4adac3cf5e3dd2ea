use std::io::Write;

use clap::{Args, Subcommand};
use lectern::{context::Storefront, ids::CourseId};
use rusty_money::Money;
use tabled::builder::Builder;

use super::{render, write_err};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Add a course to the cart
    Add {
        /// Course id
        id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a course from the cart
    Remove {
        /// Course id
        id: String,
    },

    /// Replace the quantity of a cart line
    Set {
        /// Course id
        id: String,

        /// New quantity, at least 1
        quantity: u32,
    },

    /// Show cart contents and totals
    Show,

    /// Empty the cart
    Clear,
}

pub(crate) fn run(
    command: CartCommand,
    storefront: &mut Storefront,
    out: &mut impl Write,
) -> Result<(), String> {
    let written = match command.command {
        CartSubcommand::Add { id, quantity } => {
            let id = CourseId::from(id);

            let quantity = storefront
                .add_to_cart(&id, quantity)
                .map_err(|error| format!("failed to add {id} to cart: {error}"))?;

            writeln!(out, "{id} now has quantity {quantity}")
        }
        CartSubcommand::Remove { id } => {
            let id = CourseId::from(id);

            let removed = storefront
                .remove_from_cart(&id)
                .map_err(|error| format!("failed to remove {id}: {error}"))?;

            if removed.is_some() {
                writeln!(out, "removed {id}")
            } else {
                writeln!(out, "{id} is not in the cart")
            }
        }
        CartSubcommand::Set { id, quantity } => {
            let id = CourseId::from(id);

            let updated = storefront
                .set_cart_quantity(&id, quantity)
                .map_err(|error| format!("failed to change quantity of {id}: {error}"))?;

            if updated {
                writeln!(out, "{id} now has quantity {quantity}")
            } else {
                writeln!(out, "{id} is not in the cart")
            }
        }
        CartSubcommand::Show => return show(storefront, out),
        CartSubcommand::Clear => {
            let removed = storefront
                .clear_cart()
                .map_err(|error| format!("failed to clear cart: {error}"))?;

            writeln!(out, "removed {} lines", removed.len())
        }
    };

    written.map_err(|error| write_err(&error))
}

fn show(storefront: &Storefront, out: &mut impl Write) -> Result<(), String> {
    let cart = storefront.cart();

    if cart.is_empty() {
        return writeln!(out, "cart is empty").map_err(|error| write_err(&error));
    }

    let summary = storefront
        .cart_summary()
        .map_err(|error| format!("failed to price cart: {error}"))?;

    let mut builder = Builder::default();

    builder.push_record(["Id", "Title", "Price", "Qty", "Line Total", "Added"]);

    for item in cart.items() {
        let line_total = lectern::pricing::line_total(item)
            .map_err(|error| format!("failed to price {}: {error}", item.id()))?;

        builder.push_record([
            item.id().to_string(),
            item.course.title.clone(),
            Money::from_decimal(item.course.price, cart.currency()).to_string(),
            item.quantity.to_string(),
            Money::from_decimal(line_total, cart.currency()).to_string(),
            item.added_at.strftime("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    writeln!(
        out,
        "{}\n Items:    {}\n Subtotal: {}\n Discount: {}\n Total:    {}",
        render(builder),
        summary.item_count(),
        summary.subtotal(),
        summary.discount(),
        summary.total(),
    )
    .map_err(|error| write_err(&error))
}
