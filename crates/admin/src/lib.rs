//! Sillage admin library.
//!
//! Inventory and order fulfilment for staff: cached stock and order views,
//! manual stock adjustments with an audit log, order-driven stock reduction
//! and forward-only order status changes.
//!
//! # Security
//!
//! Every `/api/inventory` and `/api/orders` route requires the admin session
//! flag, set by signing in with the shared admin password.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
