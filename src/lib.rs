//! Lectern
//!
//! Lectern tracks a visitor's way through a course storefront: browsing the
//! catalog, filling a cart, paying for it at checkout, and completing lectures
//! in the courses they own. Each store keeps its pure state transitions apart
//! from the key-value persistence that makes them survive a restart.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod context;
pub mod courses;
pub mod enrollments;
pub mod ids;
pub mod logging;
pub mod prelude;
pub mod pricing;
pub mod session;
pub mod storage;
