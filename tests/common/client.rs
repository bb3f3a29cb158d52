//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all mixlist-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing registration and authentication flows.
    /// For most tests, use `registered()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client for a freshly registered and logged-in test user
    ///
    /// # Panics
    ///
    /// Panics if registration or login fails (indicates a test
    /// infrastructure problem).
    pub async fn registered(base_url: String) -> Self {
        Self::registered_as(base_url, TEST_USER, TEST_PASS).await
    }

    /// Registers and logs in under a specific username
    pub async fn registered_as(base_url: String, username: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.register(username, password).await;
        assert!(
            response.status().is_success(),
            "Test user registration failed: {:?}",
            response.text().await
        );

        let response = client.login(username, password).await;
        assert!(
            response.status().is_success(),
            "Test user login failed: {:?}",
            response.text().await
        );

        client
    }

    // ========================================================================
    // Account Endpoints
    // ========================================================================

    /// POST /api/register with the default test profile fields
    pub async fn register(&self, username: &str, password: &str) -> Response {
        self.register_with_body(&json!({
            "username": username,
            "password": password,
            "email": TEST_EMAIL,
            "firstName": TEST_FIRST_NAME,
            "lastName": TEST_LAST_NAME,
            "imageUrl": TEST_IMAGE_URL,
        }))
        .await
    }

    /// POST /api/register with an arbitrary body
    pub async fn register_with_body(&self, body: &serde_json::Value) -> Response {
        self.client
            .post(format!("{}/api/register", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /api/login
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/api/login", self.base_url))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// POST /api/logout
    pub async fn logout(&self) -> Response {
        self.client
            .post(format!("{}/api/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// GET /api/me
    pub async fn me(&self) -> Response {
        self.client
            .get(format!("{}/api/me", self.base_url))
            .send()
            .await
            .expect("Me request failed")
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// GET /api/playlists
    pub async fn get_playlists(&self) -> Response {
        self.client
            .get(format!("{}/api/playlists", self.base_url))
            .send()
            .await
            .expect("Get playlists request failed")
    }

    /// POST /api/playlists
    pub async fn create_playlist(&self, name: &str) -> Response {
        self.client
            .post(format!("{}/api/playlists", self.base_url))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Create playlist request failed")
    }

    /// DELETE /api/playlists/{id}
    pub async fn delete_playlist(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/api/playlists/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete playlist request failed")
    }

    /// POST /api/playlists/{id}/videos with just the required fields
    pub async fn add_video(&self, playlist_id: &str, video_id: &str, title: &str) -> Response {
        self.add_video_with_body(
            playlist_id,
            &json!({
                "videoId": video_id,
                "title": title,
            }),
        )
        .await
    }

    /// POST /api/playlists/{id}/videos with an arbitrary body
    pub async fn add_video_with_body(
        &self,
        playlist_id: &str,
        body: &serde_json::Value,
    ) -> Response {
        self.client
            .post(format!(
                "{}/api/playlists/{}/videos",
                self.base_url, playlist_id
            ))
            .json(body)
            .send()
            .await
            .expect("Add video request failed")
    }

    /// DELETE /api/playlists/{id}/videos/{videoId}
    pub async fn remove_video(&self, playlist_id: &str, video_id: &str) -> Response {
        self.client
            .delete(format!(
                "{}/api/playlists/{}/videos/{}",
                self.base_url, playlist_id, video_id
            ))
            .send()
            .await
            .expect("Remove video request failed")
    }

    // ========================================================================
    // Upload Endpoints
    // ========================================================================

    /// POST /api/playlists/{id}/mp3 (multipart, field name "mp3")
    pub async fn upload_mp3(&self, playlist_id: &str, filename: &str, data: Vec<u8>) -> Response {
        let part = multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str("audio/mpeg")
            .expect("Invalid mime type");
        let form = multipart::Form::new().part("mp3", part);

        self.client
            .post(format!("{}/api/playlists/{}/mp3", self.base_url, playlist_id))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    /// GET an arbitrary path on the test server (e.g., an /uploads URL)
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Get request failed")
    }
}
