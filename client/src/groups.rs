//! Group and channel (MUC) membership.

use rostergate_contacts::{AccountId, BareJid};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;

/// Joins rooms and reports the join result once per registration.
pub trait GroupService: Send + Sync {
    /// Registers interest in the next join result for `jid`. Callers register
    /// before calling [`GroupService::join`] so a fast answer is not lost.
    fn register_join_handler(&self, account: &AccountId, jid: &BareJid) -> oneshot::Receiver<bool>;

    fn join(&self, account: &AccountId, jid: &BareJid);
}

type JoinKey = (AccountId, BareJid);

/// One-shot join waiters keyed by account and room address.
///
/// Meant to be embedded by [`GroupService`] implementations: `register` from
/// `register_join_handler`, `complete` when the server confirms or rejects the
/// join.
#[derive(Clone, Default)]
pub struct JoinHandlerRegistry {
    waiters: Arc<Mutex<HashMap<JoinKey, Vec<oneshot::Sender<bool>>>>>,
}

impl JoinHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, account: &AccountId, jid: &BareJid) -> oneshot::Receiver<bool> {
        let (tx, rx) = oneshot::channel();
        let mut waiters = self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
        waiters
            .entry((*account, jid.clone()))
            .or_default()
            .push(tx);
        rx
    }

    /// Delivers `success` to every waiter registered for the room and forgets
    /// them. Returns how many waiters were still listening.
    pub fn complete(&self, account: &AccountId, jid: &BareJid, success: bool) -> usize {
        let senders = {
            let mut waiters = self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
            waiters.remove(&(*account, jid.clone())).unwrap_or_default()
        };

        let delivered = senders
            .into_iter()
            .filter(|tx| !tx.is_closed())
            .map(|tx| tx.send(success))
            .filter(Result::is_ok)
            .count();
        debug!(%jid, success, delivered, "join result dispatched");
        delivered
    }

    /// Number of rooms with at least one waiter.
    pub fn pending(&self) -> usize {
        self.waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
