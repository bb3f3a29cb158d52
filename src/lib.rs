//! Mixlist Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod server;
pub mod store;
pub mod user;

// Re-export commonly used types for convenience
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use store::{JsonFileStore, UserStore};
pub use user::{Library, LibraryError};
