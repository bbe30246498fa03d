pub mod config;
pub mod error;
pub mod journal;
pub mod store;
pub mod types;

pub use config::ListStoreConfig;
pub use error::{ListStoreError, Result};
pub use store::{AddressListStore, ListSnapshot};
pub use types::{ListEntry, ListKey, ListMutation, ListOp, SeedEntry};
