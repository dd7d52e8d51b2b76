use super::types::{SubmissionStore, STORE_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default store file path (<data dir>/competence-score/submissions.json)
pub fn get_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("competence-score"))
        .unwrap_or_else(crate::config::get_config_dir)
        .join("submissions.json")
}

/// Load the submission store from a JSON file
///
/// If the file doesn't exist, returns a new empty store.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store(path: &Path) -> Result<SubmissionStore> {
    if !path.exists() {
        return Ok(SubmissionStore::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open submission store at {}", path.display()))?;

    let store: SubmissionStore = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load submission store at {}", path.display()))?;

    if store.version != STORE_VERSION {
        anyhow::bail!("Unsupported submission store version: {}", store.version);
    }

    Ok(store)
}

/// Save the submission store to a JSON file atomically
///
/// Uses atomic-write-file so a crash never leaves a half-written store.
/// Creates the parent directory if it doesn't exist.
pub fn save_store(path: &Path, store: &SubmissionStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory at {}", parent.display())
            })?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, store).context("Failed to serialize submission store")?;

    file.commit().context("Failed to save submission store")?;

    Ok(())
}
