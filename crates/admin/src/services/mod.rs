//! Business logic for the admin panel.

pub mod cache;
pub mod inventory;
pub mod orders;
pub mod store;

pub use cache::{ViewCache, ViewKey};
pub use inventory::{InventoryError, InventoryService};
pub use orders::{OrderError, OrderService};
pub use store::AdminStore;
