//! Results of a single add-contact submission.

use crate::ContactRecord;

/// Message shown when the oracle rejects an address without explanation.
pub const FALLBACK_CLASSIFICATION_MESSAGE: &str = "Undefined error";

/// Everything that can end an add-contact or invitation action unsuccessfully.
///
/// Every variant is terminal for the action that produced it; none is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddContactError {
    #[error("Something went wrong while parsing the string...")]
    MalformedAddress,
    #[error("{0}")]
    ClassificationFailure(String),
    #[error("Error entering MUC!")]
    JoinFailure,
    #[error("{0}")]
    InvitationFailure(String),
    #[error("Please make sure at least one account has connected before trying to add a contact or channel.")]
    NoAccount,
    #[error("The selected account does not support invitations.")]
    InvitationsUnsupported,
    #[error("storage error: {0}")]
    Storage(String),
}

impl AddContactError {
    /// Builds a classification failure from the oracle's optional message.
    pub fn classification(message: Option<String>) -> Self {
        let message = message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_CLASSIFICATION_MESSAGE.to_string());
        AddContactError::ClassificationFailure(message)
    }
}

/// Terminal result of resolving one address against one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The address already is in the account's roster; the record is unchanged.
    ExistingContact(ContactRecord),
    /// A subscription request went out; approval is still up to the peer.
    NewDirectContact(ContactRecord),
    /// The group or channel was joined.
    NewGroupMembership(ContactRecord),
    ClassificationError(AddContactError),
}

impl ResolutionOutcome {
    pub fn contact(&self) -> Option<&ContactRecord> {
        match self {
            ResolutionOutcome::ExistingContact(contact)
            | ResolutionOutcome::NewDirectContact(contact)
            | ResolutionOutcome::NewGroupMembership(contact) => Some(contact),
            ResolutionOutcome::ClassificationError(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ResolutionOutcome::ClassificationError(_))
    }

    pub fn into_result(self) -> Result<ContactRecord, AddContactError> {
        match self {
            ResolutionOutcome::ExistingContact(contact)
            | ResolutionOutcome::NewDirectContact(contact)
            | ResolutionOutcome::NewGroupMembership(contact) => Ok(contact),
            ResolutionOutcome::ClassificationError(err) => Err(err),
        }
    }
}
