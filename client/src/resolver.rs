//! Resolution of a submitted address into a roster outcome.
//!
//! A submission moves through validation, a roster lookup and, for unknown
//! addresses, a classification round-trip to the account's server. Group
//! addresses additionally wait for the join result, which then decides the
//! outcome on its own. Exactly one [`ResolutionOutcome`] is produced per call
//! and nothing is retried.

use crate::accounts::Account;
use crate::groups::GroupService;
use crate::storage::ContactStore;
use rostergate_contacts::{
    AccountId, AddContactError, AddressKind, BareJid, ContactKind, ResolutionOutcome,
};
use rostergate_jid::split_jid;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn storage_error(err: anyhow::Error) -> AddContactError {
    AddContactError::Storage(format!("{err:#}"))
}

pub struct AddressResolver {
    contacts: ContactStore,
    groups: Arc<dyn GroupService>,
}

impl AddressResolver {
    pub fn new(contacts: ContactStore, groups: Arc<dyn GroupService>) -> Self {
        Self { contacts, groups }
    }

    pub fn contacts(&self) -> &ContactStore {
        &self.contacts
    }

    /// Resolves `raw` against `account`.
    ///
    /// `raw` must already have passed the syntax check; a missing domain after
    /// canonicalization is still reported as
    /// [`AddContactError::MalformedAddress`] rather than trusted.
    /// `preauth_token` is forwarded with a new subscription request.
    pub async fn resolve(
        &self,
        raw: &str,
        account: &dyn Account,
        preauth_token: Option<&str>,
    ) -> ResolutionOutcome {
        let account_id = account.id();
        match self.try_resolve(raw, account, preauth_token).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(raw, account = %account_id, %err, "address resolution failed");
                ResolutionOutcome::ClassificationError(err)
            }
        }
    }

    async fn try_resolve(
        &self,
        raw: &str,
        account: &dyn Account,
        preauth_token: Option<&str>,
    ) -> Result<ResolutionOutcome, AddContactError> {
        let parts = split_jid(raw).map_err(|_| AddContactError::MalformedAddress)?;
        let jid = parts.bare();
        let account_id = account.id();

        if let Some(existing) = self
            .contacts
            .roster_entry(&jid, &account_id)
            .map_err(storage_error)?
        {
            debug!(%jid, account = %account_id, "address already in roster");
            return Ok(ResolutionOutcome::ExistingContact(existing));
        }

        debug!(%jid, account = %account_id, "classifying address");
        let classification = account
            .classify_address(&jid)
            .await
            .map_err(|_| AddContactError::classification(None))?;

        match classification.kind {
            AddressKind::Account => self.add_direct(&jid, account, preauth_token),
            AddressKind::Muc => self.join_group(&jid, &account_id).await,
            AddressKind::Other(kind) => {
                debug!(%jid, kind, "address cannot be added");
                Err(AddContactError::classification(classification.error_message))
            }
        }
    }

    fn add_direct(
        &self,
        jid: &BareJid,
        account: &dyn Account,
        preauth_token: Option<&str>,
    ) -> Result<ResolutionOutcome, AddContactError> {
        let account_id = account.id();
        let mut contact = self
            .contacts
            .lookup_or_create(jid, &account_id, ContactKind::Direct)
            .map_err(storage_error)?;
        contact.mark_subscription_requested();
        self.contacts.save(&contact).map_err(storage_error)?;

        account.request_subscription(&contact, preauth_token);
        info!(%jid, account = %account_id, preauth = preauth_token.is_some(), "subscription requested");
        Ok(ResolutionOutcome::NewDirectContact(contact))
    }

    async fn join_group(
        &self,
        jid: &BareJid,
        account_id: &AccountId,
    ) -> Result<ResolutionOutcome, AddContactError> {
        let joined = self.groups.register_join_handler(account_id, jid);
        self.groups.join(account_id, jid);
        debug!(%jid, account = %account_id, "waiting for join result");

        match joined.await {
            Ok(true) => {
                let mut contact = self
                    .contacts
                    .lookup_or_create(jid, account_id, ContactKind::Group)
                    .map_err(storage_error)?;
                contact.kind = ContactKind::Group;
                contact.mark_in_roster();
                self.contacts.save(&contact).map_err(storage_error)?;
                info!(%jid, account = %account_id, "joined group");
                Ok(ResolutionOutcome::NewGroupMembership(contact))
            }
            Ok(false) | Err(_) => Err(AddContactError::JoinFailure),
        }
    }
}
