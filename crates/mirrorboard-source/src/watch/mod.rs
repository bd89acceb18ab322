pub mod file_watcher;
pub mod fingerprint;

pub use file_watcher::FileWatcher;
pub use fingerprint::FileFingerprint;
