//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Email/password accounts (argon2)
//! - `cart` - Account cart operations, sign-in reconciliation, duplicate cleanup
//! - `checkout` - Order creation from the account cart

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService, CartStore, CleanupReport, MergeReport};
pub use checkout::{CheckoutError, place_order};
