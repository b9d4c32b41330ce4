pub mod locks;
pub mod models;
pub mod store;

pub use locks::{KeyGuard, KeyLocks};
pub use store::{FileStore, StoreError};
