use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Cheap identity of a file's contents, used to skip reloads when a watcher
/// fires but nothing was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    /// Last modified time of the file
    pub modified_time: SystemTime,
    /// File size in bytes for additional verification
    pub size: u64,
}

impl FileFingerprint {
    /// Create a fingerprint from a file on disk
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self {
            modified_time: metadata.modified()?,
            size: metadata.len(),
        })
    }

    /// Check if file has changed since this fingerprint was taken
    pub fn has_changed(&self, path: &Path) -> std::io::Result<bool> {
        let current = Self::from_file(path)?;
        Ok(current != *self)
    }
}
