//! Record persistence.
//!
//! Users and activity records are stored one record per id. Every write
//! replaces the whole record in a single atomic step, so writes to
//! different ids never interfere.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use uuid::Uuid;

/// Collection names, used as subdirectories of the records directory.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
}

/// A record addressed by its own id.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

/// Atomic put/get-by-id storage for one record type.
pub trait RecordStore<T>: Send + Sync {
    /// Fetch a record, `None` if absent.
    fn get(&self, id: Uuid) -> Result<Option<T>, AppError>;

    /// Insert or replace a record under its own id.
    fn put(&self, record: &T) -> Result<(), AppError>;

    /// Snapshot of every stored record, in no particular order.
    fn list(&self) -> Result<Vec<T>, AppError>;
}
