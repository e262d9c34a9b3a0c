//! Connected accounts as seen by the add-contact flow.

use rostergate_contacts::{AccountId, BareJid, Classification, ContactRecord};
use std::sync::Arc;
use tokio::sync::oneshot;

/// One authenticated XMPP session.
///
/// Requests that complete later hand back a [`oneshot::Receiver`]: the account
/// layer answers at most once, and dropping the sender without answering is
/// treated as a failed request by the caller.
pub trait Account: Send + Sync {
    fn id(&self) -> AccountId;

    /// The account's own bare address.
    fn identity(&self) -> &BareJid;

    /// Whether the server advertised the `urn:xmpp:invite#invite` command.
    fn supports_invitations(&self) -> bool;

    /// Asks the server what kind of entity `jid` is.
    fn classify_address(&self, jid: &BareJid) -> oneshot::Receiver<Classification>;

    /// Sends a presence subscription request. Fire-and-forget: success only
    /// means the request left, not that the peer approved it.
    fn request_subscription(&self, contact: &ContactRecord, preauth_token: Option<&str>);
}

/// Source of the currently connected accounts, in display order.
pub trait AccountDirectory: Send + Sync {
    fn connected_accounts(&self) -> Vec<Arc<dyn Account>>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("account index {index} out of range for {count} connected accounts")]
    OutOfRange { index: usize, count: usize },
}

/// Index of the account a submission runs against; unset when none exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSelection(Option<usize>);

impl AccountSelection {
    /// Selects the first account, or nothing when the list is empty.
    pub fn for_accounts(count: usize) -> Self {
        Self((count > 0).then_some(0))
    }

    pub fn index(&self) -> Option<usize> {
        self.0
    }

    pub fn select(&mut self, index: usize, count: usize) -> Result<(), SelectionError> {
        if index >= count {
            return Err(SelectionError::OutOfRange { index, count });
        }
        self.0 = Some(index);
        Ok(())
    }
}
