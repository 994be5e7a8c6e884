//! Profile definitions from JSON file storage

use crate::error::CodecError;
use crate::profile::DeviceProfile;
use std::path::Path;
use tokio::fs;

/// Read device profiles from a JSON file
///
/// The file holds a JSON array of profiles. Field tables are validated while
/// parsing, so a table breaking the uniqueness rules fails the whole file.
#[allow(clippy::missing_errors_doc)]
pub async fn read_profiles(path: &Path) -> Result<Vec<DeviceProfile>, CodecError> {
    let contents = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load extra device profiles, falling back to none
///
/// A missing file is expected and logged at debug level; any other failure
/// is logged as a warning.
pub async fn load_profiles(path: &Path) -> Vec<DeviceProfile> {
    match read_profiles(path).await {
        Ok(profiles) => {
            tracing::info!("Loaded {} profiles from {:?}", profiles.len(), path);
            profiles
        }
        Err(CodecError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No profiles file found at {:?}, using built-ins", path);
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Failed to load profiles file {:?}: {}", path, e);
            Vec::new()
        }
    }
}
