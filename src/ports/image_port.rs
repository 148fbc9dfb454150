//! Image store port trait.

use crate::domain::error::JournalError;

/// Which slot of an entry an image documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Before,
    After,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Before => "before",
            ImageKind::After => "after",
        }
    }
}

pub trait ImageStorePort {
    /// Persist an uploaded image and return the reference to store on the
    /// journal row (relative path, usable under the uploads route).
    fn store(
        &self,
        owner_id: i64,
        kind: ImageKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, JournalError>;

    /// Remove a stored image. A reference that no longer resolves is not
    /// an error; removal is idempotent.
    fn remove(&self, reference: &str) -> Result<(), JournalError>;
}
