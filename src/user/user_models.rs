use serde::{Deserialize, Serialize};

/// A registered account, as persisted in the store document.
///
/// Field names serialize in camelCase so the on-disk document and the API
/// bodies share one schema. The password is kept as a salted argon2 hash,
/// never in clear text.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

impl User {
    /// The public view of the account: everything except the credentials.
    pub fn profile(&self) -> Profile {
        Profile {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

/// A named, ordered collection of media items owned by exactly one user.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

/// A playlist entry: either a reference to a remote video or an uploaded
/// audio file. The `type` tag ("youtube" / "mp3") matches the document schema.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlaylistItem {
    #[serde(rename_all = "camelCase")]
    Youtube {
        video_id: String,
        title: String,
        #[serde(default)]
        thumbnail: String,
        #[serde(default)]
        channel_title: String,
        #[serde(default)]
        views: String,
        #[serde(default)]
        duration: String,
    },
    #[serde(rename_all = "camelCase")]
    Mp3 {
        filename: String,
        original_name: String,
        url: String,
    },
}

impl PlaylistItem {
    /// The video id, when this item references a remote video.
    pub fn video_id(&self) -> Option<&str> {
        match self {
            PlaylistItem::Youtube { video_id, .. } => Some(video_id),
            PlaylistItem::Mp3 { .. } => None,
        }
    }
}
