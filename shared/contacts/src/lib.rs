//! Contact models shared by the Rostergate runtime and its collaborators.

pub mod classification;
pub mod credentials;
pub mod invitation;
pub mod outcome;
pub mod trust;

pub use classification::{AddressKind, Classification};
pub use credentials::{CredentialError, Fingerprint, ScannedContact, ScannedCredential};
pub use invitation::Invitation;
pub use outcome::{AddContactError, ResolutionOutcome};
pub use trust::{TrustRecord, TrustStatus};

pub use rostergate_jid::BareJid;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Identifier of one connected account (XMPP session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// What kind of entity a roster entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    /// A single user account.
    Direct,
    /// A multi-user chat (group or channel).
    Group,
}

/// Locally stored contact, keyed by account and bare address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub account_id: AccountId,

    pub jid: BareJid,

    pub kind: ContactKind,

    /// True once the entry is part of the account's roster (subscription
    /// approved, or group joined).
    pub in_roster: bool,

    /// A presence subscription was sent and is awaiting approval.
    pub subscription_requested: bool,

    pub created_ms: i64,

    pub updated_ms: i64,
}

impl ContactRecord {
    pub fn new(account_id: AccountId, jid: BareJid, kind: ContactKind) -> Self {
        let now = now_ms();
        Self {
            account_id,
            jid,
            kind,
            in_roster: false,
            subscription_requested: false,
            created_ms: now,
            updated_ms: now,
        }
    }

    pub fn mark_in_roster(&mut self) {
        self.in_roster = true;
        self.subscription_requested = false;
        self.updated_ms = now_ms();
    }

    pub fn mark_subscription_requested(&mut self) {
        self.subscription_requested = true;
        self.updated_ms = now_ms();
    }

    pub fn is_group(&self) -> bool {
        self.kind == ContactKind::Group
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
