mod json_file_store;

pub use json_file_store::JsonFileStore;

use crate::user::User;
use anyhow::Result;

/// Persistence seam for the whole user collection.
///
/// The store deals in full documents only: callers load everything, mutate in
/// memory and save everything back. There are no partial-field updates.
pub trait UserStore: Send + Sync {
    /// Loads the persisted user collection.
    /// An absent or unreadable document yields an empty collection, never an
    /// error; only genuine I/O failures surface as Err.
    fn load(&self) -> Result<Vec<User>>;

    /// Serializes the full collection and replaces the persisted document.
    /// From the caller's point of view the replacement is atomic: no reader
    /// of this store ever observes a partially written document.
    fn save(&self, users: &[User]) -> Result<()>;
}
