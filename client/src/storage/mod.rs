//! sled-backed persistence for roster entries and imported key trust.

use std::path::Path;

use anyhow::{Context, Result};
use rostergate_contacts::{
    AccountId, BareJid, ContactKind, ContactRecord, ScannedCredential, TrustRecord,
};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RosterStorage {
    db: sled::Db,
}

impl RosterStorage {
    const CONTACTS_TREE: &'static str = "contacts";
    const TRUST_TREE: &'static str = "trust";

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create storage directory {:?}", path))?;
        let db = sled::open(path)
            .with_context(|| format!("failed to open sled database at {:?}", path))?;
        Ok(Self { db })
    }

    /// Database that lives only as long as this handle.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .context("failed to open temporary sled database")?;
        Ok(Self { db })
    }

    pub fn contacts(&self) -> Result<ContactStore> {
        let tree = self.db.open_tree(Self::CONTACTS_TREE)?;
        Ok(ContactStore { tree })
    }

    pub fn trust(&self) -> Result<TrustStore> {
        let tree = self.db.open_tree(Self::TRUST_TREE)?;
        Ok(TrustStore { tree })
    }
}

fn contact_key(account: &AccountId, jid: &BareJid) -> String {
    format!("{}\0{}", account.0, jid)
}

fn account_prefix(account: &AccountId) -> String {
    format!("{}\0", account.0)
}

fn trust_prefix(account: &AccountId, jid: &BareJid) -> String {
    format!("{}\0{}\0", account.0, jid)
}

/// Contact records keyed by account and bare address.
#[derive(Clone)]
pub struct ContactStore {
    tree: sled::Tree,
}

impl ContactStore {
    /// Read-only lookup; never creates a record.
    pub fn lookup(&self, jid: &BareJid, account: &AccountId) -> Result<Option<ContactRecord>> {
        let key = contact_key(account, jid);
        match self.tree.get(key.as_bytes())? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Returns the record only when it is part of the roster.
    pub fn roster_entry(&self, jid: &BareJid, account: &AccountId) -> Result<Option<ContactRecord>> {
        Ok(self.lookup(jid, account)?.filter(|contact| contact.in_roster))
    }

    /// Returns the stored record, creating it with `kind` when absent.
    ///
    /// Idempotent: repeated calls for the same address and account return the
    /// same record.
    pub fn lookup_or_create(
        &self,
        jid: &BareJid,
        account: &AccountId,
        kind: ContactKind,
    ) -> Result<ContactRecord> {
        let key = contact_key(account, jid);
        let fresh = ContactRecord::new(*account, jid.clone(), kind);
        let encoded = bincode::serialize(&fresh)?;

        match self
            .tree
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(encoded))?
        {
            Ok(()) => {
                self.tree.flush()?;
                debug!(%jid, account = %account, ?kind, "contact record created");
                Ok(fresh)
            }
            Err(conflict) => {
                let current = conflict
                    .current
                    .context("contact record vanished during creation")?;
                Ok(bincode::deserialize(&current)?)
            }
        }
    }

    pub fn save(&self, contact: &ContactRecord) -> Result<()> {
        let key = contact_key(&contact.account_id, &contact.jid);
        let encoded = bincode::serialize(contact)?;
        self.tree.insert(key.as_bytes(), encoded)?;
        self.tree.flush()?;
        Ok(())
    }

    pub fn remove(&self, jid: &BareJid, account: &AccountId) -> Result<bool> {
        let key = contact_key(account, jid);
        let removed = self.tree.remove(key.as_bytes())?.is_some();
        self.tree.flush()?;
        Ok(removed)
    }

    pub fn contacts_for(&self, account: &AccountId) -> Result<Vec<ContactRecord>> {
        let mut contacts = Vec::new();
        for entry in self.tree.scan_prefix(account_prefix(account).as_bytes()) {
            let (_, value) = entry?;
            contacts.push(bincode::deserialize(&value)?);
        }
        Ok(contacts)
    }
}

/// Result of importing a scanned credential.
#[derive(Debug, Clone, Default)]
pub struct TrustImport {
    pub records: Vec<TrustRecord>,
    /// Devices whose previously stored key was replaced by the scanned one.
    pub replaced_devices: Vec<u32>,
}

/// Device key trust, keyed by account, bare address and device id.
#[derive(Clone)]
pub struct TrustStore {
    tree: sled::Tree,
}

impl TrustStore {
    /// Stores every scanned fingerprint as verified.
    ///
    /// A scanned code is out-of-band verification, so it wins over a different
    /// key stored earlier for the same device.
    pub fn import(
        &self,
        account: &AccountId,
        jid: &BareJid,
        credential: &ScannedCredential,
    ) -> Result<TrustImport> {
        let mut import = TrustImport::default();
        let prefix = trust_prefix(account, jid);

        for (device_id, fingerprint) in credential.iter() {
            let key = format!("{}{}", prefix, device_id);
            if let Some(existing) = self.tree.get(key.as_bytes())? {
                let previous: TrustRecord = bincode::deserialize(&existing)?;
                if previous.fingerprint != *fingerprint {
                    warn!(%jid, device_id, "replacing stored key with scanned fingerprint");
                    import.replaced_devices.push(device_id);
                }
            }

            let mut record =
                TrustRecord::new_unverified(*account, jid.clone(), device_id, fingerprint.clone());
            record.mark_verified();
            self.tree
                .insert(key.as_bytes(), bincode::serialize(&record)?)?;
            import.records.push(record);
        }

        self.tree.flush()?;
        debug!(%jid, imported = import.records.len(), "fingerprints imported");
        Ok(import)
    }

    pub fn records_for(&self, account: &AccountId, jid: &BareJid) -> Result<Vec<TrustRecord>> {
        let mut records = Vec::new();
        for entry in self.tree.scan_prefix(trust_prefix(account, jid).as_bytes()) {
            let (_, value) = entry?;
            records.push(bincode::deserialize(&value)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostergate_contacts::{Fingerprint, TrustStatus};

    fn jid(raw: &str) -> BareJid {
        BareJid::parse(raw).unwrap()
    }

    #[test]
    fn lookup_or_create_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RosterStorage::open(dir.path()).unwrap();
        let contacts = storage.contacts().unwrap();
        let account = AccountId::new();
        let alice = jid("alice@example.com");

        assert!(contacts.lookup(&alice, &account).unwrap().is_none());

        let first = contacts
            .lookup_or_create(&alice, &account, ContactKind::Direct)
            .unwrap();
        let second = contacts
            .lookup_or_create(&alice, &account, ContactKind::Group)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.kind, ContactKind::Direct);
    }

    #[test]
    fn records_are_scoped_per_account() {
        let storage = RosterStorage::temporary().unwrap();
        let contacts = storage.contacts().unwrap();
        let first_account = AccountId::new();
        let second_account = AccountId::new();
        let alice = jid("alice@example.com");

        let mut record = contacts
            .lookup_or_create(&alice, &first_account, ContactKind::Direct)
            .unwrap();
        record.mark_in_roster();
        contacts.save(&record).unwrap();

        assert!(contacts.roster_entry(&alice, &first_account).unwrap().is_some());
        assert!(contacts.roster_entry(&alice, &second_account).unwrap().is_none());
        assert_eq!(contacts.contacts_for(&first_account).unwrap().len(), 1);
        assert!(contacts.contacts_for(&second_account).unwrap().is_empty());
    }

    #[test]
    fn roster_entry_ignores_pending_subscriptions() {
        let storage = RosterStorage::temporary().unwrap();
        let contacts = storage.contacts().unwrap();
        let account = AccountId::new();
        let bob = jid("bob@example.org");

        let mut record = contacts
            .lookup_or_create(&bob, &account, ContactKind::Direct)
            .unwrap();
        record.mark_subscription_requested();
        contacts.save(&record).unwrap();

        assert!(contacts.roster_entry(&bob, &account).unwrap().is_none());
        assert!(contacts.remove(&bob, &account).unwrap());
        assert!(contacts.lookup(&bob, &account).unwrap().is_none());
    }

    #[test]
    fn trust_import_verifies_and_replaces_changed_keys() {
        let storage = RosterStorage::temporary().unwrap();
        let trust = storage.trust().unwrap();
        let account = AccountId::new();
        let alice = jid("alice@example.com");

        let first: ScannedCredential = [
            (1, Fingerprint::parse("05aa").unwrap()),
            (2, Fingerprint::parse("05bb").unwrap()),
        ]
        .into_iter()
        .collect();
        let import = trust.import(&account, &alice, &first).unwrap();
        assert_eq!(import.records.len(), 2);
        assert!(import.replaced_devices.is_empty());
        assert!(import.records.iter().all(|r| r.status == TrustStatus::Verified));

        let second: ScannedCredential = [(2, Fingerprint::parse("05cc").unwrap())]
            .into_iter()
            .collect();
        let import = trust.import(&account, &alice, &second).unwrap();
        assert_eq!(import.replaced_devices, vec![2]);

        let stored = trust.records_for(&account, &alice).unwrap();
        assert_eq!(stored.len(), 2);
        let device_two = stored.iter().find(|r| r.device_id == 2).unwrap();
        assert_eq!(device_two.fingerprint.as_str(), "05cc");
        assert!(device_two.is_verified());
    }
}
