use super::UserStore;
use crate::user::User;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::warn;

/// Stores the user collection as a single pretty-printed JSON array on disk.
///
/// Saves go through a temp file in the same directory followed by a rename,
/// so a crash mid-write leaves the previous document intact and no reader
/// ever sees a half-written one.
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(file_path: PathBuf) -> JsonFileStore {
        JsonFileStore { file_path }
    }
}

impl UserStore for JsonFileStore {
    fn load(&self) -> Result<Vec<User>> {
        let mut file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(_) => return Ok(Vec::new()),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Error reading store file {:?}", self.file_path))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&content) {
            Ok(users) => Ok(users),
            Err(err) => {
                warn!(
                    "Store file {:?} is not a valid user document ({}), starting empty.",
                    self.file_path, err
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, users: &[User]) -> Result<()> {
        let json_string = serde_json::to_string_pretty(users)?;

        let dir = self
            .file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Error creating store directory {:?}", dir))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Error creating temp file in {:?}", dir))?;
        std::io::Write::write_all(&mut tmp, json_string.as_bytes())
            .with_context(|| "Error writing store document")?;
        tmp.persist(&self.file_path)
            .with_context(|| format!("Error replacing store file {:?}", self.file_path))?;
        Ok(())
    }
}
