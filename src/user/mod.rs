pub mod auth;
mod library;
pub mod user_models;

pub use auth::SessionToken;
pub use library::{AddVideoOutcome, AudioFile, Library, LibraryError, NewUser, VideoDetails};
pub use user_models::{Playlist, PlaylistItem, Profile, User};
