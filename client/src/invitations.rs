//! Server-side invitation creation.

use crate::accounts::Account;
use rostergate_contacts::{AddContactError, Invitation};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Answer of the invitation service: the invitation or the server's message.
pub type InvitationResult = Result<Invitation, String>;

pub trait InvitationService: Send + Sync {
    fn create(&self, account: &dyn Account) -> oneshot::Receiver<InvitationResult>;
}

/// Creates an invitation for `account` and maps the answer onto the error
/// taxonomy.
pub async fn request_invitation(
    service: &dyn InvitationService,
    account: &dyn Account,
) -> Result<Invitation, AddContactError> {
    if !account.supports_invitations() {
        return Err(AddContactError::InvitationsUnsupported);
    }

    let host = account.identity().host().to_string();
    debug!(%host, "creating invitation");

    match service.create(account).await {
        Ok(Ok(invitation)) => {
            debug!(%host, landing = %invitation.landing_url, "invitation created");
            Ok(invitation)
        }
        Ok(Err(message)) => {
            warn!(%host, %message, "invitation creation failed");
            Err(AddContactError::InvitationFailure(message))
        }
        Err(_) => {
            warn!(%host, "invitation service dropped the request");
            Err(AddContactError::InvitationFailure(
                "The server did not answer the invitation request".to_string(),
            ))
        }
    }
}
