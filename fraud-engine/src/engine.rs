//! Classification pass over a single transfer

use crate::resolver::AccountResolver;
use crate::rules::RuleChain;
use crate::Result;
use std::sync::Arc;
use transfer_core::{Blacklist, Transfer, TransferStore, UserDirectory};

/// Screens inbound transfers before they are persisted
///
/// The pass is synchronous and runs exactly once per transfer attempt:
/// resolve both parties (always executed, never short-circuits), then run
/// the rule chain. The transfer always leaves with a status; the pass only
/// fails when a collaborator does, and never leaves a partially classified
/// transfer on the happy path.
pub struct TransferScreener {
    transfers: Arc<dyn TransferStore>,
    resolver: AccountResolver,
    rules: RuleChain,
}

impl TransferScreener {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        transfers: Arc<dyn TransferStore>,
        blacklist: Arc<dyn Blacklist>,
    ) -> Self {
        Self {
            transfers,
            resolver: AccountResolver::new(directory),
            rules: RuleChain::new(blacklist),
        }
    }

    /// Classify the transfer in place, populating status and reason
    pub fn classify(&self, transfer: &mut Transfer) -> Result<()> {
        transfer.sender = self.resolver.resolve(&transfer.sender)?;
        transfer.receiver = self.resolver.resolve(&transfer.receiver)?;

        self.rules.evaluate(transfer, self.transfers.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use transfer_core::{
        Account, InMemoryBlacklist, InMemoryDirectory, InMemoryTransferStore, PixKeyType,
        TransferStatus,
    };

    fn screener() -> (TransferScreener, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let screener = TransferScreener::new(
            directory.clone(),
            Arc::new(InMemoryTransferStore::new()),
            Arc::new(InMemoryBlacklist::new()),
        );
        (screener, directory)
    }

    #[test]
    fn test_classify_resolves_parties() {
        let (screener, directory) = screener();

        let mut transfer = Transfer::new(
            Account::stub("111.111.111-11", PixKeyType::Cpf),
            Account::stub("bob@x.com", PixKeyType::Email),
            Decimal::from(50),
            "lunch",
        );

        screener.classify(&mut transfer).unwrap();

        assert!(transfer.sender.is_persisted());
        assert!(transfer.receiver.is_persisted());
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_classify_keeps_existing_account() {
        let (screener, directory) = screener();

        let alice = directory
            .create(Account {
                id: None,
                name: "Alice".to_string(),
                tax_id: "11111111111".to_string(),
                pix_key: "11111111111".to_string(),
                key_type: PixKeyType::Cpf,
            })
            .unwrap();

        let mut transfer = Transfer::new(
            Account::stub("11111111111", PixKeyType::Cpf),
            Account::stub("bob@x.com", PixKeyType::Email),
            Decimal::from(50),
            "lunch",
        );

        screener.classify(&mut transfer).unwrap();

        assert_eq!(transfer.sender.id, alice.id);
        assert_eq!(transfer.sender.name, "Alice");
    }

    #[test]
    fn test_end_to_end_success_scenario() {
        let (screener, _directory) = screener();

        let mut transfer = Transfer::new(
            Account::stub("111.111.111-11", PixKeyType::Cpf),
            Account::stub("bob@x.com", PixKeyType::Email),
            Decimal::new(5_000, 2), // 50.00
            "lunch",
        );

        screener.classify(&mut transfer).unwrap();

        assert_eq!(transfer.status, Some(TransferStatus::Success));
        assert_eq!(transfer.fraud_reason, None);
    }
}
