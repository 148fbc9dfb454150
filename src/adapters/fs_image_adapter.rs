//! Filesystem image store adapter.
//!
//! Uploads live under `<root>/before/` and `<root>/after/`. Stored
//! references are relative paths (`before/<file>`), usable directly under
//! the web layer's uploads route.

use crate::domain::error::JournalError;
use crate::ports::config_port::ConfigPort;
use crate::ports::image_port::{ImageKind, ImageStorePort};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

pub struct FsImageAdapter {
    root: PathBuf,
}

impl FsImageAdapter {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        Self::new(config.get_string_or("uploads", "root", "uploads"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Strip everything that could escape the upload directory or confuse
    /// a filesystem; only the base name of the original upload survives.
    fn sanitize_name(original: &str) -> String {
        let base = original
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(original);
        let cleaned: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if cleaned.trim_matches(['.', '_']).is_empty() {
            "image".to_string()
        } else {
            cleaned
        }
    }

    /// A stored reference must stay inside the root: relative, no parent
    /// components.
    fn is_safe_reference(reference: &str) -> bool {
        let path = Path::new(reference);
        !reference.is_empty()
            && path.is_relative()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
    }
}

impl ImageStorePort for FsImageAdapter {
    fn store(
        &self,
        owner_id: i64,
        kind: ImageKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, JournalError> {
        let dir = self.root.join(kind.as_str());
        fs::create_dir_all(&dir).map_err(|e| JournalError::ImageStore {
            reason: format!("failed to create {}: {}", dir.display(), e),
        })?;

        let suffix = hex::encode(rand::random::<[u8; 4]>());
        let file_name = format!(
            "{owner_id}-{}-{suffix}-{}",
            Utc::now().timestamp_millis(),
            Self::sanitize_name(original_name)
        );
        let path = dir.join(&file_name);

        fs::write(&path, bytes).map_err(|e| JournalError::ImageStore {
            reason: format!("failed to write {}: {}", path.display(), e),
        })?;

        Ok(format!("{}/{}", kind.as_str(), file_name))
    }

    fn remove(&self, reference: &str) -> Result<(), JournalError> {
        if !Self::is_safe_reference(reference) {
            return Err(JournalError::ImageStore {
                reason: format!("refusing to remove unsafe reference: {reference}"),
            });
        }

        match fs::remove_file(self.root.join(reference)) {
            Ok(()) => Ok(()),
            // Already gone is success: removal is idempotent.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JournalError::ImageStore {
                reason: format!("failed to remove {reference}: {e}"),
            }),
        }
    }
}
