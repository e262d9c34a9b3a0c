//! In-memory collaborators for embedding hosts and tests.
//!
//! Every collaborator answers from a script set up front. Requests without a
//! scripted answer are dropped, which callers observe as "no answer".

use crate::accounts::{Account, AccountDirectory};
use crate::groups::{GroupService, JoinHandlerRegistry};
use crate::invitations::{InvitationResult, InvitationService};
use rostergate_contacts::{AccountId, BareJid, Classification, ContactRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A subscription request recorded by [`ScriptedAccount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub jid: BareJid,
    pub preauth_token: Option<String>,
}

/// Account whose classification answers are scripted per address.
pub struct ScriptedAccount {
    id: AccountId,
    identity: BareJid,
    invitations: bool,
    answers: Mutex<HashMap<BareJid, Classification>>,
    classified: Mutex<Vec<BareJid>>,
    subscriptions: Mutex<Vec<SubscriptionRequest>>,
}

impl ScriptedAccount {
    pub fn new(identity: BareJid) -> Self {
        Self {
            id: AccountId::new(),
            identity,
            invitations: false,
            answers: Mutex::new(HashMap::new()),
            classified: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_invitations(mut self) -> Self {
        self.invitations = true;
        self
    }

    pub fn answer(&self, jid: &BareJid, classification: Classification) {
        locked(&self.answers).insert(jid.clone(), classification);
    }

    /// Addresses classified so far, in request order.
    pub fn classified(&self) -> Vec<BareJid> {
        locked(&self.classified).clone()
    }

    pub fn subscription_requests(&self) -> Vec<SubscriptionRequest> {
        locked(&self.subscriptions).clone()
    }
}

impl Account for ScriptedAccount {
    fn id(&self) -> AccountId {
        self.id
    }

    fn identity(&self) -> &BareJid {
        &self.identity
    }

    fn supports_invitations(&self) -> bool {
        self.invitations
    }

    fn classify_address(&self, jid: &BareJid) -> oneshot::Receiver<Classification> {
        let (tx, rx) = oneshot::channel();
        locked(&self.classified).push(jid.clone());
        if let Some(answer) = locked(&self.answers).get(jid).cloned() {
            let _ = tx.send(answer);
        }
        rx
    }

    fn request_subscription(&self, contact: &ContactRecord, preauth_token: Option<&str>) {
        locked(&self.subscriptions).push(SubscriptionRequest {
            jid: contact.jid.clone(),
            preauth_token: preauth_token.map(str::to_string),
        });
    }
}

/// Fixed, ordered list of connected accounts.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    accounts: Vec<Arc<dyn Account>>,
}

impl MemoryDirectory {
    pub fn new(accounts: Vec<Arc<dyn Account>>) -> Self {
        Self { accounts }
    }
}

impl AccountDirectory for MemoryDirectory {
    fn connected_accounts(&self) -> Vec<Arc<dyn Account>> {
        self.accounts.clone()
    }
}

/// Group service completing joins from a script, or on demand via
/// [`MemoryGroupService::finish`].
#[derive(Clone, Default)]
pub struct MemoryGroupService {
    registry: JoinHandlerRegistry,
    results: Arc<Mutex<HashMap<BareJid, bool>>>,
    joined: Arc<Mutex<Vec<BareJid>>>,
}

impl MemoryGroupService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completes every later join of `jid` immediately with `success`.
    pub fn script(&self, jid: &BareJid, success: bool) {
        locked(&self.results).insert(jid.clone(), success);
    }

    /// Completes an outstanding join by hand.
    pub fn finish(&self, account: &AccountId, jid: &BareJid, success: bool) -> usize {
        self.registry.complete(account, jid, success)
    }

    /// Rooms a join was issued for, in order.
    pub fn joined(&self) -> Vec<BareJid> {
        locked(&self.joined).clone()
    }

    pub fn pending(&self) -> usize {
        self.registry.pending()
    }
}

impl GroupService for MemoryGroupService {
    fn register_join_handler(&self, account: &AccountId, jid: &BareJid) -> oneshot::Receiver<bool> {
        self.registry.register(account, jid)
    }

    fn join(&self, account: &AccountId, jid: &BareJid) {
        locked(&self.joined).push(jid.clone());
        let scripted = locked(&self.results).get(jid).copied();
        if let Some(success) = scripted {
            self.registry.complete(account, jid, success);
        }
    }
}

/// Invitation service returning one scripted answer per request.
#[derive(Default)]
pub struct MemoryInvitations {
    answer: Mutex<Option<InvitationResult>>,
}

impl MemoryInvitations {
    pub fn answering(answer: InvitationResult) -> Self {
        Self {
            answer: Mutex::new(Some(answer)),
        }
    }

    /// Service that never answers.
    pub fn silent() -> Self {
        Self::default()
    }
}

impl InvitationService for MemoryInvitations {
    fn create(&self, _account: &dyn Account) -> oneshot::Receiver<InvitationResult> {
        let (tx, rx) = oneshot::channel();
        if let Some(answer) = locked(&self.answer).clone() {
            let _ = tx.send(answer);
        }
        rx
    }
}
