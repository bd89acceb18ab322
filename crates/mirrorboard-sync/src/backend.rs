use futures::future::BoxFuture;
use mirrorboard_core::BoardResult;
use std::fmt;
use std::future::Future;

pub type CommandFuture = BoxFuture<'static, BoardResult<()>>;

/// What issuing a backend command hands back.
pub enum CommandReceipt {
    /// The command reports success or failure when the future resolves.
    Deferred(CommandFuture),
    /// The command gives no acknowledgement. It is assumed to succeed after a
    /// grace delay and cannot be rolled back.
    Detached,
}

impl CommandReceipt {
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = BoardResult<()>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    /// A receipt whose outcome is already known.
    pub fn ready(result: BoardResult<()>) -> Self {
        Self::deferred(async move { result })
    }
}

impl fmt::Debug for CommandReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deferred(_) => f.write_str("CommandReceipt::Deferred"),
            Self::Detached => f.write_str("CommandReceipt::Detached"),
        }
    }
}

/// The service that owns the authoritative board. An empty description is
/// sent as `""`.
#[cfg_attr(test, mockall::automock)]
pub trait BoardBackend: Send + Sync {
    fn move_card(&self, card_id: &str, target_list_id: &str) -> CommandReceipt;

    fn create_card(&self, list_id: &str, name: &str, description: &str) -> CommandReceipt;

    fn update_card(&self, card_id: &str, name: &str, description: &str) -> CommandReceipt;

    fn delete_card(&self, card_id: &str) -> CommandReceipt;
}
