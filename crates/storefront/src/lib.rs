//! Sillage storefront library.
//!
//! The public JSON API: catalog, guest and account carts, sign-in with guest
//! cart reconciliation, duplicate cart-row cleanup, checkout, order history,
//! wishlist, newsletter and the cart-count signal stream.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod signals;
pub mod state;
