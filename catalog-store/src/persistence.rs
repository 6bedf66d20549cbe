//! File persistence helpers.
//!
//! Loads and saves JSON state under the user's config directory. Files may
//! hold an API token, so they are written atomically and readable by the
//! owner only.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - Linux: `~/.config/catalog`
/// - macOS: `~/Library/Application Support/catalog`
/// - Windows: `%APPDATA%\catalog`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("catalog"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// Returns the default cart file path.
pub fn default_cart_path() -> PathBuf {
    default_config_dir().join("cart.json")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = %format_args!("{mode:o}"), "Set permissions");
    Ok(())
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

/// Sets owner read/write only (0600) on Unix.
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    set_mode(path, 0o600).await
}

/// Sets owner-only access (0700) on a directory on Unix.
async fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    set_mode(path, 0o700).await
}

// ============================================================================
// File Operations
// ============================================================================

/// Saves data to a JSON file.
///
/// Creates the parent directory if needed, writes to a temp file and renames
/// it over the target, then restricts permissions on Unix.
///
/// # Errors
///
/// Returns error if serialization or any file operation fails.
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    tokio::fs::rename(&temp_path, path).await?;

    set_restrictive_permissions(path).await?;

    debug!(path = %path.display(), bytes = json.len(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
///
/// # Errors
///
/// Returns error if the file cannot be read or does not parse.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    Ok(data)
}

/// Loads data from a JSON file, returning the default if it is missing or
/// corrupt.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            // A missing file is the normal first-run case.
            if !matches!(e, StoreError::Io(_)) {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

/// Ensures a directory exists, creating it owner-only if it does not.
///
/// # Errors
///
/// Returns error if the directory cannot be created.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        set_restrictive_dir_permissions(path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert!(default_settings_path().ends_with("catalog/settings.json"));
        assert!(default_cart_path().ends_with("catalog/cart.json"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.json");
        save_json(&test_file, &serde_json::json!({"api_token": "secret"}))
            .await
            .unwrap();

        let mode = tokio::fs::metadata(&test_file).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
