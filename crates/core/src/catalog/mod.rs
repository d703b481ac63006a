//! Menu catalog: priced items sold at the counter.

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::CatalogError;
pub use service::CatalogService;
pub use store::CatalogStore;
pub use types::{MenuItem, MenuItemPatch, NewMenuItem};
