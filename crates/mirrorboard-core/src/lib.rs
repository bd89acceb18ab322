pub mod config;
pub mod error;
pub mod result;

pub use config::{AppConfig, BoardReference, CardConfig, SyncSettings};
pub use error::BoardError;
pub use result::BoardResult;
