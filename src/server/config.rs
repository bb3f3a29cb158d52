use super::RequestsLoggingLevel;
use std::path::PathBuf;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Directory uploaded audio files are written to, served at /uploads.
    pub uploads_dir: PathBuf,
    pub frontend_dir_path: Option<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3000,
            uploads_dir: PathBuf::from("uploads"),
            frontend_dir_path: None,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}
