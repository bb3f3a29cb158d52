use super::auth::{password, SessionToken};
use super::user_models::{Playlist, PlaylistItem, Profile, User};
use crate::store::UserStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Service failure taxonomy. Maps one-to-one onto HTTP statuses at the
/// server boundary.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Not logged in")]
    Auth,
    #[error("{0}")]
    NotFound(String),
    #[error("Storage failure")]
    Io(#[from] anyhow::Error),
}

/// Outcome of adding a video reference to a playlist.
#[derive(Debug, PartialEq)]
pub struct AddVideoOutcome {
    /// True when an item with the same video id was already present
    /// and nothing was mutated.
    pub already: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub channel_title: Option<String>,
    pub views: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AudioFile {
    pub filename: String,
    pub original_name: String,
    pub url: String,
}

/// Account and playlist service over the user store, plus the in-memory
/// session table.
///
/// Every mutating operation is a full load → mutate in memory → full save
/// against the store; validation and ownership checks all happen before the
/// save, so a failed operation leaves the document untouched. Callers share
/// one `Library` behind a mutex, which serializes the whole
/// load-mutate-save sequence and rules out lost updates between requests.
pub struct Library {
    store: Arc<dyn UserStore>,
    // token -> canonical username; process lifetime only, never persisted.
    sessions: HashMap<SessionToken, String>,
}

fn new_playlist_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: u32 = rand::random();
    format!("{}_{:08x}", millis, suffix)
}

fn validate_password(password: &str) -> Result<(), LibraryError> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if password.len() < 6 || !has_letter || !has_digit {
        return Err(LibraryError::Validation(
            "Password must be >= 6 and include 1 letter and 1 number".to_string(),
        ));
    }
    Ok(())
}

impl Library {
    pub fn new(store: Arc<dyn UserStore>) -> Library {
        Library {
            store,
            sessions: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accounts & sessions
    // ------------------------------------------------------------------

    pub fn register(&self, new_user: NewUser) -> Result<(), LibraryError> {
        let all_present = [
            &new_user.username,
            &new_user.password,
            &new_user.email,
            &new_user.first_name,
            &new_user.last_name,
            &new_user.image_url,
        ]
        .iter()
        .all(|field| !field.is_empty());
        if !all_present {
            return Err(LibraryError::Validation(
                "All fields are required".to_string(),
            ));
        }

        validate_password(&new_user.password)?;

        let mut users = self.store.load()?;
        let exists = users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(&new_user.username));
        if exists {
            return Err(LibraryError::Conflict(
                "Username already exists".to_string(),
            ));
        }

        let salt = password::generate_b64_salt();
        let hash = password::hash(new_user.password.as_bytes(), &salt)?;

        users.push(User {
            username: new_user.username,
            password_hash: hash,
            password_salt: salt,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            image_url: new_user.image_url,
            playlists: vec![],
        });

        self.store.save(&users)?;
        Ok(())
    }

    pub fn login(
        &mut self,
        username: &str,
        plain_password: &str,
    ) -> Result<(SessionToken, Profile), LibraryError> {
        if username.is_empty() || plain_password.is_empty() {
            return Err(LibraryError::Validation(
                "Missing credentials".to_string(),
            ));
        }

        let users = self.store.load()?;
        let user = users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .filter(|u| password::verify(plain_password, &u.password_hash).unwrap_or(false))
            .ok_or(LibraryError::Auth)?;

        let token = SessionToken::generate();
        // Sessions bind to the canonical stored username, not the one typed in.
        self.sessions.insert(token.clone(), user.username.clone());
        Ok((token, user.profile()))
    }

    /// Idempotent: unknown tokens are ignored.
    pub fn logout(&mut self, token: &SessionToken) {
        self.sessions.remove(token);
    }

    pub fn resolve_session(&self, token: &SessionToken) -> Option<String> {
        self.sessions.get(token).cloned()
    }

    /// The session may outlive the account; a vanished user reads as
    /// "not logged in" rather than a missing resource.
    pub fn profile(&self, username: &str) -> Result<Profile, LibraryError> {
        let users = self.store.load()?;
        users
            .iter()
            .find(|u| u.username == username)
            .map(User::profile)
            .ok_or(LibraryError::Auth)
    }

    // ------------------------------------------------------------------
    // Playlists
    // ------------------------------------------------------------------

    pub fn playlists(&self, username: &str) -> Result<Vec<Playlist>, LibraryError> {
        let users = self.store.load()?;
        Ok(users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.playlists.clone())
            .unwrap_or_default())
    }

    pub fn create_playlist(&self, username: &str, name: &str) -> Result<Playlist, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::Validation(
                "Playlist name required".to_string(),
            ));
        }

        let mut users = self.store.load()?;
        let user = Self::find_user_mut(&mut users, username)?;

        if user
            .playlists
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
        {
            return Err(LibraryError::Conflict(
                "Playlist already exists".to_string(),
            ));
        }

        let playlist = Playlist {
            id: new_playlist_id(),
            name: name.to_string(),
            items: vec![],
        };
        user.playlists.push(playlist.clone());

        self.store.save(&users)?;
        Ok(playlist)
    }

    /// Idempotent: deleting an id the user does not have is a success.
    pub fn delete_playlist(&self, username: &str, playlist_id: &str) -> Result<(), LibraryError> {
        let mut users = self.store.load()?;
        let user = Self::find_user_mut(&mut users, username)?;

        user.playlists.retain(|p| p.id != playlist_id);

        self.store.save(&users)?;
        Ok(())
    }

    pub fn add_video(
        &self,
        username: &str,
        playlist_id: &str,
        video: VideoDetails,
    ) -> Result<AddVideoOutcome, LibraryError> {
        if video.video_id.is_empty() || video.title.is_empty() {
            return Err(LibraryError::Validation(
                "videoId and title required".to_string(),
            ));
        }

        let mut users = self.store.load()?;
        let user = Self::find_user_mut(&mut users, username)?;
        let playlist = Self::find_playlist_mut(user, playlist_id)?;

        if playlist
            .items
            .iter()
            .any(|item| item.video_id() == Some(video.video_id.as_str()))
        {
            return Ok(AddVideoOutcome { already: true });
        }

        playlist.items.push(PlaylistItem::Youtube {
            video_id: video.video_id,
            title: video.title,
            thumbnail: video.thumbnail.unwrap_or_default(),
            channel_title: video.channel_title.unwrap_or_default(),
            views: video.views.unwrap_or_else(|| "0".to_string()),
            duration: video.duration.unwrap_or_default(),
        });

        self.store.save(&users)?;
        Ok(AddVideoOutcome { already: false })
    }

    /// Idempotent over the item: removing an absent video id is a success,
    /// but the playlist itself must exist.
    pub fn remove_video(
        &self,
        username: &str,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), LibraryError> {
        let mut users = self.store.load()?;
        let user = Self::find_user_mut(&mut users, username)?;
        let playlist = Self::find_playlist_mut(user, playlist_id)?;

        playlist
            .items
            .retain(|item| item.video_id() != Some(video_id));

        self.store.save(&users)?;
        Ok(())
    }

    /// Checks playlist ownership without mutating anything. Used before an
    /// upload's file write so bogus requests never hit the disk.
    pub fn ensure_playlist(&self, username: &str, playlist_id: &str) -> Result<(), LibraryError> {
        let mut users = self.store.load()?;
        let user = Self::find_user_mut(&mut users, username)?;
        Self::find_playlist_mut(user, playlist_id)?;
        Ok(())
    }

    pub fn add_audio(
        &self,
        username: &str,
        playlist_id: &str,
        audio: AudioFile,
    ) -> Result<(), LibraryError> {
        let mut users = self.store.load()?;
        let user = Self::find_user_mut(&mut users, username)?;
        let playlist = Self::find_playlist_mut(user, playlist_id)?;

        playlist.items.push(PlaylistItem::Mp3 {
            filename: audio.filename,
            original_name: audio.original_name,
            url: audio.url,
        });

        self.store.save(&users)?;
        Ok(())
    }

    fn find_user_mut<'a>(
        users: &'a mut Vec<User>,
        username: &str,
    ) -> Result<&'a mut User, LibraryError> {
        users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or(LibraryError::Auth)
    }

    fn find_playlist_mut<'a>(
        user: &'a mut User,
        playlist_id: &str,
    ) -> Result<&'a mut Playlist, LibraryError> {
        user.playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| LibraryError::NotFound("Playlist not found".to_string()))
    }
}
