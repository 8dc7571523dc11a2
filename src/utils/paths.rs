//! Path utilities

use std::path::Path;

use anyhow::{Context, Result};

/// Ensure a directory exists, creating missing parents
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}
