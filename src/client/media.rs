//! Local asset promotion.
//!
//! Picked images and recordings arrive as temporary files owned by the
//! platform picker. Before an override may reference one it is copied into
//! the app's own data directory so the path stays valid across restarts.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::shared::error::Result;

/// Promote a picked file into the app data directory, returning the
/// persistent device-local path to store in an override entry.
pub async fn promote_asset(source: &Path) -> Result<PathBuf> {
    promote_asset_into(&default_assets_dir(), source).await
}

/// Promote into an explicit directory. Split out for tests.
pub async fn promote_asset_into(dir: &Path, source: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let file_name = match source.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };
    let target = dir.join(file_name);

    tokio::fs::copy(source, &target).await?;
    tracing::debug!(source = %source.display(), target = %target.display(), "asset promoted");
    Ok(target)
}

/// Platform-specific directory for promoted assets
fn default_assets_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push("soylem");
    path.push("assets");
    path
}
