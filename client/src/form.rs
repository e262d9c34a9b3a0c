//! State of the "add contact or channel" screen, without any UI toolkit.
//!
//! The form owns what the user typed, picked and scanned. Every action returns
//! a value describing what to show next ([`FormAlert`], [`SubmitResult`],
//! [`InvitationAlert`]); the presentation layer applies it and keeps no flags
//! of its own.

use crate::accounts::{Account, AccountDirectory, AccountSelection, SelectionError};
use crate::invitations::{request_invitation, InvitationService};
use crate::resolver::AddressResolver;
use crate::storage::{TrustImport, TrustStore};
use rostergate_contacts::{
    AddContactError, ContactKind, ContactRecord, Invitation, ResolutionOutcome, ScannedContact,
    ScannedCredential,
};
use rostergate_jid::{validate_input, InputProblem};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// Alert to present after a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormAlert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    /// Contact to hand to the caller once the alert is closed.
    pub dismiss_with: Option<ContactRecord>,
}

impl FormAlert {
    fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            title: title.into(),
            message: message.into(),
            dismiss_with: None,
        }
    }

    fn success(title: impl Into<String>, message: impl Into<String>, contact: ContactRecord) -> Self {
        Self {
            kind: AlertKind::Success,
            title: title.into(),
            message: message.into(),
            dismiss_with: Some(contact),
        }
    }

    /// Closing a success alert closes the whole screen.
    pub fn closes_form(&self) -> bool {
        self.kind == AlertKind::Success
    }
}

/// Everything a submission produced.
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub alert: FormAlert,
    /// `None` when validation stopped the submission before resolution.
    pub outcome: Option<ResolutionOutcome>,
    pub trust: Option<TrustImport>,
}

impl SubmitResult {
    fn rejected(alert: FormAlert) -> Self {
        Self {
            alert,
            outcome: None,
            trust: None,
        }
    }
}

/// Result of the "create invitation" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationAlert {
    Ready {
        title: String,
        invitation: Invitation,
    },
    Failed(FormAlert),
}

pub struct AddContactForm {
    accounts: Vec<Arc<dyn Account>>,
    selection: AccountSelection,
    input: String,
    scanned: Option<ScannedCredential>,
    scanned_preauth: Option<String>,
    import_fingerprints: bool,
    preauth_token: Option<String>,
}

impl AddContactForm {
    /// Snapshots the connected accounts; the first one is preselected.
    pub fn new(directory: &dyn AccountDirectory) -> Self {
        let accounts = directory.connected_accounts();
        let selection = AccountSelection::for_accounts(accounts.len());
        Self {
            accounts,
            selection,
            input: String::new(),
            scanned: None,
            scanned_preauth: None,
            import_fingerprints: false,
            preauth_token: None,
        }
    }

    pub fn with_prefill(mut self, jid: impl Into<String>) -> Self {
        self.input = jid.into();
        self
    }

    /// Token from an invitation link, forwarded with the subscription request.
    pub fn with_preauth_token(mut self, token: impl Into<String>) -> Self {
        self.preauth_token = Some(token.into());
        self
    }

    /// Token sent with the next subscription request; a scanned one wins.
    pub fn preauth_token(&self) -> Option<&str> {
        self.scanned_preauth.as_deref().or(self.preauth_token.as_deref())
    }

    pub fn accounts(&self) -> &[Arc<dyn Account>] {
        &self.accounts
    }

    pub fn has_accounts(&self) -> bool {
        !self.accounts.is_empty()
    }

    pub fn show_account_picker(&self) -> bool {
        self.accounts.len() > 1
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.index()
    }

    pub fn selected_account(&self) -> Option<&Arc<dyn Account>> {
        self.selection.index().and_then(|idx| self.accounts.get(idx))
    }

    pub fn select_account(&mut self, index: usize) -> Result<(), SelectionError> {
        self.selection.select(index, self.accounts.len())
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the typed address. Any scanned credential no longer matches
    /// the input and is dropped.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        if self.scanned.take().is_some() {
            debug!("address edited, scanned credential dropped");
        }
        self.scanned_preauth = None;
    }

    /// The input is read-only while it holds a scanned address.
    pub fn input_locked(&self) -> bool {
        self.scanned.is_some()
    }

    pub fn apply_scan(&mut self, scanned: ScannedContact) {
        debug!(
            fingerprints = scanned.credential.len(),
            preauth = scanned.preauth_token.is_some(),
            "applying scanned contact"
        );
        self.input = scanned.address;
        self.scanned = Some(scanned.credential);
        self.scanned_preauth = scanned.preauth_token;
        self.import_fingerprints = true;
    }

    pub fn clear_scanned(&mut self) {
        self.input.clear();
        self.scanned = None;
        self.scanned_preauth = None;
        self.import_fingerprints = true;
    }

    pub fn scanned(&self) -> Option<&ScannedCredential> {
        self.scanned.as_ref()
    }

    pub fn show_import_toggle(&self) -> bool {
        self.scanned.as_ref().is_some_and(|credential| !credential.is_empty())
    }

    pub fn import_fingerprints(&self) -> bool {
        self.import_fingerprints
    }

    pub fn set_import_fingerprints(&mut self, enabled: bool) {
        self.import_fingerprints = enabled;
    }

    pub fn submit_label(&self) -> &'static str {
        if self.scanned.is_some() {
            "Add scanned Group/Channel or Contact"
        } else {
            "Add Group/Channel or Contact"
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selected_account().is_some() && validate_input(&self.input).is_ok()
    }

    /// Validation alert for the current input, if it cannot be submitted.
    pub fn validation_alert(&self) -> Option<FormAlert> {
        match validate_input(&self.input) {
            Ok(()) => None,
            Err(InputProblem::Empty) => Some(FormAlert::error(
                "No Empty Values!",
                "Please make sure you have entered a valid jid.",
            )),
            Err(InputProblem::Invalid) => Some(FormAlert::error(
                "Invalid Credentials!",
                "The jid you want to add should be in the format user@domain.tld.",
            )),
        }
    }

    /// Validates, resolves and, on success, imports scanned fingerprints.
    ///
    /// Holding `&mut self` across the await keeps the input and the account
    /// selection frozen until the submission has an outcome.
    pub async fn submit(&mut self, resolver: &AddressResolver, trust: &TrustStore) -> SubmitResult {
        let Some(account) = self.selected_account().cloned() else {
            let err = AddContactError::NoAccount;
            return SubmitResult::rejected(FormAlert::error("Error", err.to_string()));
        };
        if let Some(alert) = self.validation_alert() {
            return SubmitResult::rejected(alert);
        }

        let outcome = resolver
            .resolve(&self.input, account.as_ref(), self.preauth_token())
            .await;

        let trust_import = match outcome.contact() {
            Some(contact) if contact.kind == ContactKind::Direct => {
                self.import_scanned(trust, account.as_ref(), contact)
            }
            _ => None,
        };

        SubmitResult {
            alert: self.alert_for(&outcome),
            outcome: Some(outcome),
            trust: trust_import,
        }
    }

    fn import_scanned(
        &mut self,
        trust: &TrustStore,
        account: &dyn Account,
        contact: &ContactRecord,
    ) -> Option<TrustImport> {
        if !self.import_fingerprints || !self.show_import_toggle() {
            return None;
        }
        let credential = self.scanned.take()?;
        self.scanned_preauth = None;
        match trust.import(&account.id(), &contact.jid, &credential) {
            Ok(import) => Some(import),
            Err(err) => {
                warn!(jid = %contact.jid, ?err, "failed to import scanned fingerprints");
                None
            }
        }
    }

    fn alert_for(&self, outcome: &ResolutionOutcome) -> FormAlert {
        match outcome {
            ResolutionOutcome::ExistingContact(contact) => {
                let message = if self.accounts.len() > 1 {
                    "This contact is already in the contact list of the selected account"
                } else {
                    "This contact is already in your contact list"
                };
                FormAlert::success("Already present", message, contact.clone())
            }
            ResolutionOutcome::NewDirectContact(contact) => FormAlert::success(
                "Permission Requested",
                "The new contact will be added to your contacts list when the person you've added has approved your request.",
                contact.clone(),
            ),
            ResolutionOutcome::NewGroupMembership(contact) => FormAlert::success(
                "Success!",
                format!("Successfully joined MUC {}!", contact.jid),
                contact.clone(),
            ),
            ResolutionOutcome::ClassificationError(AddContactError::JoinFailure) => {
                FormAlert::error(AddContactError::JoinFailure.to_string(), "")
            }
            ResolutionOutcome::ClassificationError(err) => FormAlert::error("Error", err.to_string()),
        }
    }

    /// Whether the invitation action should be offered for the selected account.
    pub fn can_create_invitation(&self) -> bool {
        self.selected_account()
            .is_some_and(|account| account.supports_invitations())
    }

    pub async fn create_invitation(&self, service: &dyn InvitationService) -> InvitationAlert {
        let Some(account) = self.selected_account() else {
            let err = AddContactError::NoAccount;
            return InvitationAlert::Failed(FormAlert::error("Error", err.to_string()));
        };
        let host = account.identity().host().to_string();

        match request_invitation(service, account.as_ref()).await {
            Ok(invitation) => InvitationAlert::Ready {
                title: format!("Invitation for {} created", host),
                invitation,
            },
            Err(err) => InvitationAlert::Failed(FormAlert::error(
                format!("Failed to create invitation for {}", host),
                err.to_string(),
            )),
        }
    }
}
