//! Domain models for the storefront.
//!
//! These are the validated shapes handlers work with and serialize to JSON;
//! database row types stay private to the `db` module.

pub mod cart;
pub mod catalog;
pub mod session;
pub mod user;
pub mod wishlist;

pub use cart::{CartItemView, CartView};
pub use catalog::{Perfume, PerfumeImage, PerfumeSummary};
pub use session::CurrentUser;
pub use user::User;
pub use wishlist::WishlistItem;
