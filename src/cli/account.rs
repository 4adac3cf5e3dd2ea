use std::io::Write;

use clap::{Args, Subcommand};
use lectern::context::Storefront;

use super::write_err;

#[derive(Debug, Args)]
pub(crate) struct AccountCommand {
    #[command(subcommand)]
    command: AccountSubcommand,
}

#[derive(Debug, Subcommand)]
enum AccountSubcommand {
    /// Sign in
    Login {
        /// Email address
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,
}

pub(crate) fn run(
    command: AccountCommand,
    storefront: &mut Storefront,
    out: &mut impl Write,
) -> Result<(), String> {
    let written = match command.command {
        AccountSubcommand::Login { email, password } => {
            let user = storefront
                .login(&email, &password)
                .map_err(|error| format!("failed to sign in: {error}"))?;

            writeln!(out, "signed in as {} <{}>", user.name, user.email)
        }
        AccountSubcommand::Register {
            name,
            email,
            password,
        } => {
            let user = storefront
                .register(&name, &email, &password)
                .map_err(|error| format!("failed to register: {error}"))?;

            writeln!(out, "registered and signed in as {} <{}>", user.name, user.email)
        }
        AccountSubcommand::Logout => {
            storefront
                .logout()
                .map_err(|error| format!("failed to sign out: {error}"))?;

            writeln!(out, "signed out")
        }
        AccountSubcommand::Whoami => match storefront.user() {
            Some(user) => writeln!(out, "{} <{}> ({:?})", user.name, user.email, user.role),
            None => writeln!(out, "not signed in"),
        },
    };

    written.map_err(|error| write_err(&error))
}
