//! Fixtures shared by the contract tests.

use rostergate_client::memory::{MemoryDirectory, MemoryGroupService, ScriptedAccount};
use rostergate_client::{Account, AddContactForm, AddressResolver, AppConfig, AppState, TrustStore};
use rostergate_contacts::BareJid;
use std::sync::Arc;

pub fn jid(raw: &str) -> BareJid {
    BareJid::parse(raw).unwrap()
}

/// One in-memory client: storage, a group service and connected accounts.
pub struct Client {
    pub state: Arc<AppState>,
    pub groups: Arc<MemoryGroupService>,
    pub resolver: AddressResolver,
    pub trust: TrustStore,
    pub accounts: Vec<Arc<ScriptedAccount>>,
}

impl Client {
    pub fn with_accounts(identities: &[&str]) -> Self {
        let state = AppState::in_memory(AppConfig::default()).unwrap();
        let groups = Arc::new(MemoryGroupService::new());
        let resolver = state.resolver(groups.clone()).unwrap();
        let trust = state.trust().unwrap();
        let accounts = identities
            .iter()
            .map(|identity| Arc::new(ScriptedAccount::new(jid(identity))))
            .collect();
        Self {
            state,
            groups,
            resolver,
            trust,
            accounts,
        }
    }

    pub fn account(&self, index: usize) -> &Arc<ScriptedAccount> {
        &self.accounts[index]
    }

    pub fn form(&self) -> AddContactForm {
        let accounts = self
            .accounts
            .iter()
            .map(|account| account.clone() as Arc<dyn Account>)
            .collect();
        AddContactForm::new(&MemoryDirectory::new(accounts))
    }
}
