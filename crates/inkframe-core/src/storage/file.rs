//! Directory-backed scene store.

use super::{BoxFuture, SceneStore, StorageError, StorageResult, non_blank};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each frame's scene as `<frame id>.json` in a directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a store in the platform data directory.
    ///
    /// On Linux: `~/.local/share/inkframe/scenes/`
    /// On Windows: `%LOCALAPPDATA%\inkframe\scenes\`
    pub fn default_location() -> StorageResult<Self> {
        let base = Self::default_dir()
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base)
    }

    /// Directory used by [`FileStore::default_location`], if one can be determined.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|base| base.join("inkframe").join("scenes"))
    }

    fn scene_path(&self, frame_id: &str) -> PathBuf {
        let safe_id: String = frame_id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl SceneStore for FileStore {
    fn load_scene(&self, frame_id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.scene_path(frame_id);
        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            let content = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Ok(non_blank(content))
        })
    }

    fn save_scene(&self, frame_id: &str, serialized: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.scene_path(frame_id);
        let serialized = serialized.to_string();
        Box::pin(async move {
            fs::write(&path, serialized).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }
}
