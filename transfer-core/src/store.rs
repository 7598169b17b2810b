//! Storage interfaces and in-memory implementations
//!
//! The screening engine treats these as transactional black boxes: it does
//! not manage locking itself and relies on the backend for per-account
//! read-your-writes consistency, so a blacklist append made during one pass
//! is visible to the next pass's membership check.
//!
//! The in-memory implementations back the tests and the default wiring;
//! durable backends live behind the same traits.

use crate::error::{Error, Result};
use crate::types::{Account, BlacklistEntry, Transfer, TransferStatus};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum rows returned by history and status listings
pub const RECENT_WINDOW: usize = 15;

/// Account lookup and provisioning by PIX key
pub trait UserDirectory: Send + Sync {
    /// Find an account by id
    fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Find an account by exact PIX key match
    fn find_by_key(&self, key: &str) -> Result<Option<Account>>;

    /// Persist a new account, assigning its identifier
    fn create(&self, account: Account) -> Result<Account>;
}

/// Transfer persistence and history lookups
pub trait TransferStore: Send + Sync {
    /// Persist a new transfer, assigning its identifier
    ///
    /// Caller-provided timestamps are preserved.
    fn save(&self, transfer: Transfer) -> Result<Transfer>;

    /// Replace an existing transfer
    fn update(&self, transfer: Transfer) -> Result<Transfer>;

    /// Find a transfer by id
    fn find_by_id(&self, id: Uuid) -> Result<Option<Transfer>>;

    /// All transfers in insertion order
    fn find_all(&self) -> Result<Vec<Transfer>>;

    /// Transfers with the given status, newest first, capped at [`RECENT_WINDOW`]
    fn find_by_status(&self, status: TransferStatus) -> Result<Vec<Transfer>>;

    /// Most recent transfers *received* by the account, newest first by
    /// creation timestamp, capped at [`RECENT_WINDOW`]
    fn recent_received_by(&self, account_id: Uuid) -> Result<Vec<Transfer>>;

    /// Remove a transfer
    fn delete(&self, id: Uuid) -> Result<()>;
}

/// Append-only registry of accounts barred by prior fraud triggers
pub trait Blacklist: Send + Sync {
    /// Whether the account has at least one entry
    fn contains(&self, account_id: Uuid) -> Result<bool>;

    /// Append an entry for the account
    ///
    /// Always an insert; duplicate entries for the same account are
    /// harmless since presence is boolean.
    fn add(&self, account_id: Uuid, listed_at: DateTime<Utc>) -> Result<()>;

    /// All entries, for administrative listing
    fn entries(&self) -> Result<Vec<BlacklistEntry>>;
}

/// In-memory account directory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    // Map: account_id -> Account
    accounts: Arc<DashMap<Uuid, Account>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl UserDirectory for InMemoryDirectory {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    fn find_by_key(&self, key: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.value().pix_key == key)
            .map(|entry| entry.value().clone()))
    }

    fn create(&self, account: Account) -> Result<Account> {
        let mut account = account;
        let id = account.id.unwrap_or_else(Uuid::new_v4);
        account.id = Some(id);
        tracing::debug!(account_id = %id, pix_key = %account.pix_key, "Account created");
        self.accounts.insert(id, account.clone());
        Ok(account)
    }
}

/// In-memory transfer store
#[derive(Debug, Default)]
pub struct InMemoryTransferStore {
    transfers: Arc<RwLock<Vec<Transfer>>>,
}

impl InMemoryTransferStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransferStore for InMemoryTransferStore {
    fn save(&self, transfer: Transfer) -> Result<Transfer> {
        let mut transfer = transfer;
        if transfer.id.is_none() {
            transfer.id = Some(Uuid::new_v4());
        }
        self.transfers.write().push(transfer.clone());
        Ok(transfer)
    }

    fn update(&self, transfer: Transfer) -> Result<Transfer> {
        let id = transfer
            .id
            .ok_or_else(|| Error::Storage("cannot update an unsaved transfer".to_string()))?;

        let mut transfers = self.transfers.write();
        let slot = transfers
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or(Error::TransferNotFound(id))?;
        *slot = transfer.clone();

        Ok(transfer)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Transfer>> {
        Ok(self
            .transfers
            .read()
            .iter()
            .find(|t| t.id == Some(id))
            .cloned())
    }

    fn find_all(&self) -> Result<Vec<Transfer>> {
        Ok(self.transfers.read().clone())
    }

    fn find_by_status(&self, status: TransferStatus) -> Result<Vec<Transfer>> {
        let mut matching: Vec<Transfer> = self
            .transfers
            .read()
            .iter()
            .filter(|t| t.status == Some(status))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(RECENT_WINDOW);

        Ok(matching)
    }

    fn recent_received_by(&self, account_id: Uuid) -> Result<Vec<Transfer>> {
        let mut received: Vec<Transfer> = self
            .transfers
            .read()
            .iter()
            .filter(|t| t.receiver.id == Some(account_id))
            .cloned()
            .collect();

        received.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        received.truncate(RECENT_WINDOW);

        Ok(received)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let mut transfers = self.transfers.write();
        let before = transfers.len();
        transfers.retain(|t| t.id != Some(id));

        if transfers.len() == before {
            return Err(Error::TransferNotFound(id));
        }

        Ok(())
    }
}

/// In-memory blacklist
#[derive(Debug, Default)]
pub struct InMemoryBlacklist {
    // Map: account_id -> entries (duplicates allowed)
    listed: Arc<DashMap<Uuid, Vec<BlacklistEntry>>>,
}

impl InMemoryBlacklist {
    /// Create an empty blacklist
    pub fn new() -> Self {
        Self::default()
    }
}

impl Blacklist for InMemoryBlacklist {
    fn contains(&self, account_id: Uuid) -> Result<bool> {
        Ok(self.listed.contains_key(&account_id))
    }

    fn add(&self, account_id: Uuid, listed_at: DateTime<Utc>) -> Result<()> {
        tracing::debug!(account_id = %account_id, "Account appended to blacklist");
        self.listed
            .entry(account_id)
            .or_default()
            .push(BlacklistEntry::new(account_id, listed_at));
        Ok(())
    }

    fn entries(&self) -> Result<Vec<BlacklistEntry>> {
        Ok(self
            .listed
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixKeyType;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn persisted_account(key: &str) -> Account {
        Account {
            id: Some(Uuid::new_v4()),
            name: "Alice".to_string(),
            tax_id: "11111111111".to_string(),
            pix_key: key.to_string(),
            key_type: PixKeyType::Email,
        }
    }

    fn transfer_to(receiver: &Account, minutes_ago: i64) -> Transfer {
        let sender = persisted_account("sender@example.com");
        let mut transfer = Transfer::new(
            sender,
            receiver.clone(),
            Decimal::from(100),
            "pagamento normal",
        );
        transfer.created_at = Utc::now() - Duration::minutes(minutes_ago);
        transfer
    }

    #[test]
    fn test_directory_create_assigns_id() {
        let directory = InMemoryDirectory::new();
        let stub = Account::stub("bob@example.com", PixKeyType::Email);

        let created = directory.create(stub).unwrap();
        assert!(created.is_persisted());

        let found = directory.find_by_key("bob@example.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(directory.find_by_key("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_recent_received_scoped_to_receiver() {
        let store = InMemoryTransferStore::new();
        let receiver = persisted_account("receiver@example.com");
        let other = persisted_account("other@example.com");

        store.save(transfer_to(&receiver, 1)).unwrap();
        store.save(transfer_to(&other, 2)).unwrap();
        store.save(transfer_to(&receiver, 3)).unwrap();

        let history = store.recent_received_by(receiver.id.unwrap()).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|t| t.receiver.id == receiver.id));
        // Newest first
        assert!(history[0].created_at > history[1].created_at);
    }

    #[test]
    fn test_recent_received_capped_at_window() {
        let store = InMemoryTransferStore::new();
        let receiver = persisted_account("receiver@example.com");

        for minutes in 0..20 {
            store.save(transfer_to(&receiver, minutes)).unwrap();
        }

        let history = store.recent_received_by(receiver.id.unwrap()).unwrap();
        assert_eq!(history.len(), RECENT_WINDOW);
    }

    #[test]
    fn test_find_by_status_filters() {
        let store = InMemoryTransferStore::new();
        let receiver = persisted_account("receiver@example.com");

        let mut approved = transfer_to(&receiver, 1);
        approved.approve();
        store.save(approved).unwrap();

        let mut failed = transfer_to(&receiver, 2);
        failed.fail(crate::types::FraudReason::StrangeValue);
        store.save(failed).unwrap();

        let successes = store.find_by_status(TransferStatus::Success).unwrap();
        assert_eq!(successes.len(), 1);
        assert_eq!(successes[0].status, Some(TransferStatus::Success));
    }

    #[test]
    fn test_update_unknown_transfer() {
        let store = InMemoryTransferStore::new();
        let receiver = persisted_account("receiver@example.com");

        let mut transfer = transfer_to(&receiver, 0);
        transfer.id = Some(Uuid::new_v4());

        assert!(matches!(
            store.update(transfer),
            Err(Error::TransferNotFound(_))
        ));
    }

    #[test]
    fn test_delete() {
        let store = InMemoryTransferStore::new();
        let receiver = persisted_account("receiver@example.com");

        let saved = store.save(transfer_to(&receiver, 0)).unwrap();
        let id = saved.id.unwrap();

        store.delete(id).unwrap();
        assert!(store.find_by_id(id).unwrap().is_none());
        assert!(matches!(store.delete(id), Err(Error::TransferNotFound(_))));
    }

    #[test]
    fn test_blacklist_duplicates_harmless() {
        let blacklist = InMemoryBlacklist::new();
        let account_id = Uuid::new_v4();

        assert!(!blacklist.contains(account_id).unwrap());

        blacklist.add(account_id, Utc::now()).unwrap();
        blacklist.add(account_id, Utc::now()).unwrap();

        assert!(blacklist.contains(account_id).unwrap());
        assert_eq!(blacklist.entries().unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_recent_received_ordered_and_capped(offsets in prop::collection::vec(0i64..10_000, 0..40)) {
            let store = InMemoryTransferStore::new();
            let receiver = persisted_account("receiver@example.com");

            for minutes in offsets {
                store.save(transfer_to(&receiver, minutes)).unwrap();
            }

            let history = store.recent_received_by(receiver.id.unwrap()).unwrap();
            prop_assert!(history.len() <= RECENT_WINDOW);
            prop_assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        }
    }
}
