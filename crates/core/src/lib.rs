//! Sillage Core - Shared domain types and pure planning logic.
//!
//! This crate provides the types used across all Sillage components:
//! - `storefront` - Public perfume storefront API
//! - `admin` - Inventory and order administration API
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The cart and inventory modules compute *plans*
//! (which lines to insert, which rows to collapse, which stock to reduce);
//! the storefront and admin crates execute those plans against the database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, quantities, prices, emails, and statuses
//! - [`cart`] - Cart lines, the guest cart, merge and duplicate planning
//! - [`order`] - Orders, order items, and total computation
//! - [`inventory`] - Stock records, adjustment log, reductions, and summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod inventory;
pub mod order;
pub mod types;

pub use types::*;
