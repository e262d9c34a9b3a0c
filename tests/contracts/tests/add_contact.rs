use rostergate_client::memory::MemoryInvitations;
use rostergate_client::{Account, AlertKind, InvitationAlert};
use rostergate_contacts::{
    AddContactError, Classification, ContactKind, Invitation, ResolutionOutcome, ScannedContact,
    TrustStatus,
};
use rostergate_contracts::{jid, Client};

#[tokio::test]
async fn new_account_address_becomes_pending_contact() {
    let client = Client::with_accounts(&["me@example.com"]);
    let account = client.account(0);
    account.answer(&jid("alice@example.com"), Classification::account());
    let mut form = client.form().with_prefill("alice@example.com");

    let result = form.submit(&client.resolver, &client.trust).await;

    assert_eq!(result.alert.kind, AlertKind::Success);
    let Some(ResolutionOutcome::NewDirectContact(contact)) = result.outcome else {
        panic!("expected a new direct contact");
    };
    let stored = client
        .resolver
        .contacts()
        .lookup(&contact.jid, &account.id())
        .unwrap()
        .expect("record created");
    assert!(stored.subscription_requested);
    assert_eq!(account.subscription_requests().len(), 1);
}

#[tokio::test]
async fn rejected_join_leaves_no_record() {
    let client = Client::with_accounts(&["me@example.com"]);
    let account = client.account(0);
    let room = jid("team@conference.example.com");
    account.answer(&room, Classification::muc());
    let mut form = client.form().with_prefill(room.as_str());

    let pending = {
        let resolver = &client.resolver;
        let trust = &client.trust;
        let groups = client.groups.clone();
        let finish = async {
            while groups.pending() == 0 {
                tokio::task::yield_now().await;
            }
            groups.finish(&account.id(), &room, false)
        };
        let (result, delivered) = tokio::join!(form.submit(resolver, trust), finish);
        assert_eq!(delivered, 1);
        result
    };

    assert_eq!(
        pending.outcome,
        Some(ResolutionOutcome::ClassificationError(AddContactError::JoinFailure))
    );
    assert_eq!(pending.alert.title, "Error entering MUC!");
    assert!(client
        .resolver
        .contacts()
        .lookup(&room, &account.id())
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn implausible_address_never_reaches_the_server() {
    let client = Client::with_accounts(&["me@example.com"]);
    let mut form = client.form().with_prefill("bad-address");

    let result = form.submit(&client.resolver, &client.trust).await;

    assert_eq!(result.alert.title, "Invalid Credentials!");
    assert!(result.outcome.is_none());
    assert!(client.account(0).classified().is_empty());
}

#[tokio::test]
async fn roster_member_is_returned_unchanged() {
    let client = Client::with_accounts(&["me@example.com", "me@work.example"]);
    let account = client.account(1);
    let bob = jid("bob@example.org");
    let mut existing = client
        .resolver
        .contacts()
        .lookup_or_create(&bob, &account.id(), ContactKind::Direct)
        .unwrap();
    existing.mark_in_roster();
    client.resolver.contacts().save(&existing).unwrap();

    let mut form = client.form().with_prefill("Bob@Example.org/phone");
    form.select_account(1).unwrap();

    for _ in 0..2 {
        let result = form.submit(&client.resolver, &client.trust).await;
        assert_eq!(
            result.outcome,
            Some(ResolutionOutcome::ExistingContact(existing.clone()))
        );
        assert_eq!(result.alert.dismiss_with.as_ref(), Some(&existing));
    }
    assert!(account.classified().is_empty());
}

#[tokio::test]
async fn scanned_code_adds_contact_and_trusts_its_devices() {
    let client = Client::with_accounts(&["me@example.com"]);
    let account = client.account(0);
    account.answer(&jid("carol@example.net"), Classification::account());
    let mut form = client.form();

    form.apply_scan(
        ScannedContact::from_uri(
            "xmpp:carol@example.net?omemo-sid-11=05aabbccdd;omemo-sid-12=05eeff0011",
        )
        .unwrap(),
    );
    let result = form.submit(&client.resolver, &client.trust).await;

    assert!(result.outcome.as_ref().is_some_and(ResolutionOutcome::is_success));
    let records = client
        .trust
        .records_for(&account.id(), &jid("carol@example.net"))
        .unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == TrustStatus::Verified));
}

#[tokio::test]
async fn invitation_needs_server_support() {
    let client = Client::with_accounts(&["me@example.com"]);
    let form = client.form();
    let service = MemoryInvitations::answering(Ok(Invitation::new(
        "https://example.com/invite/abc",
        None,
    )));

    let alert = form.create_invitation(&service).await;

    let InvitationAlert::Failed(alert) = alert else {
        panic!("expected unsupported server");
    };
    assert_eq!(alert.title, "Failed to create invitation for example.com");
}
