pub mod feed;
pub mod store;
pub mod traits;
pub mod watch;

pub use feed::SourceFeed;
pub use store::*;
pub use traits::*;
pub use watch::*;
