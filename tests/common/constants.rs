//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, profile fields, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user
pub const TEST_USER: &str = "testuser";

/// Regular test user password (satisfies the letter+digit rule)
pub const TEST_PASS: &str = "testpass123";

/// Second test user, for ownership isolation tests
pub const OTHER_USER: &str = "otheruser";

pub const OTHER_PASS: &str = "otherpass456";

// ============================================================================
// Test Profile Fields
// ============================================================================

pub const TEST_EMAIL: &str = "testuser@example.com";

pub const TEST_FIRST_NAME: &str = "Test";

pub const TEST_LAST_NAME: &str = "User";

pub const TEST_IMAGE_URL: &str = "https://example.com/avatar.png";

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for the test server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for server readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
