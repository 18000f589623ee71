pub mod error;
pub mod format;
pub mod locator;
pub mod poll;
pub mod progress;
pub mod reconcile;
pub mod snapshot;

pub use error::{SyncError, SyncResult};
pub use poll::{PollLoop, PollOptions, SharedPage, TickOutcome};
pub use snapshot::{DownloadSnapshot, DownloadStatus};
