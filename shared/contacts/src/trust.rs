//! Trust state for OMEMO identity keys imported from scanned codes.

use crate::credentials::Fingerprint;
use crate::{now_ms, AccountId, BareJid};
use serde::{Deserialize, Serialize};

/// Trust status for one device key of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustStatus {
    /// Known but not yet verified by the user.
    Unverified,
    /// Verified out of band (scanned QR code).
    Verified,
    /// Previously verified but the device now presents a different key.
    Changed,
}

/// Trust record associating a contact's device with its key fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRecord {
    pub account_id: AccountId,
    pub jid: BareJid,
    pub device_id: u32,
    pub fingerprint: Fingerprint,
    pub status: TrustStatus,
    pub verified_at_ms: Option<i64>,
}

impl TrustRecord {
    pub fn new_unverified(
        account_id: AccountId,
        jid: BareJid,
        device_id: u32,
        fingerprint: Fingerprint,
    ) -> Self {
        Self {
            account_id,
            jid,
            device_id,
            fingerprint,
            status: TrustStatus::Unverified,
            verified_at_ms: None,
        }
    }

    pub fn mark_verified(&mut self) {
        self.status = TrustStatus::Verified;
        self.verified_at_ms = Some(now_ms());
    }

    pub fn mark_changed(&mut self) {
        self.status = TrustStatus::Changed;
    }

    pub fn is_verified(&self) -> bool {
        self.status == TrustStatus::Verified
    }
}
