/*
[INPUT]:  Device ids chosen when initializing the MPC device
[OUTPUT]: The last used device id in LATEST_DEVICE_ID.txt
[POS]:    Storage layer - device id store
[UPDATE]: When the device id file format changes
*/

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::error::Result;

/// Single-value store for the last device id
#[derive(Debug, Clone)]
pub struct DeviceIdStore {
    path: PathBuf,
}

impl DeviceIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored id, `None` when the file is missing or empty
    pub async fn get_device_id(&self) -> Result<Option<String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let id = content.strip_suffix('\n').unwrap_or(&content);
        if id.is_empty() {
            Ok(None)
        } else {
            Ok(Some(id.to_string()))
        }
    }

    /// Overwrite the stored id
    pub async fn set_device_id(&self, device_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, format!("{device_id}\n")).await?;
        info!(path = %self.path.display(), device_id, "device id saved");
        Ok(())
    }
}
