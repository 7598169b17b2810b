//! Transfer workflow: submit, lookup, and analyst overrides
//!
//! The service drives one screening pass per inbound transfer, persists the
//! classified result, and maps transfers into response views for the
//! transport layer.

use crate::engine::TransferScreener;
use crate::{Error, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use transfer_core::{
    Account, Blacklist, PixKeyType, Transfer, TransferStatus, TransferStore, UserDirectory,
};
use uuid::Uuid;

/// One party of an inbound transfer request: a PIX key and its type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyRequest {
    pub pix_key: String,
    pub pix_key_type: PixKeyType,
}

impl PartyRequest {
    fn to_stub(&self) -> Account {
        Account::stub(self.pix_key.clone(), self.pix_key_type)
    }
}

/// Inbound transfer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender: PartyRequest,
    pub receiver: PartyRequest,
    pub amount: Decimal,
    pub description: String,
}

impl TransferRequest {
    fn into_transfer(self) -> Transfer {
        Transfer::new(
            self.sender.to_stub(),
            self.receiver.to_stub(),
            self.amount,
            self.description,
        )
    }
}

/// Account summary in API responses
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub tax_id: String,
    pub name: String,
    pub pix_key: String,
    pub pix_key_type: String,
}

impl AccountView {
    fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            tax_id: account.tax_id.clone(),
            name: account.name.clone(),
            pix_key: account.pix_key.clone(),
            pix_key_type: account.key_type.code().to_string(),
        }
    }
}

/// Classified transfer in API responses
///
/// Fraud fields are present only when a rule classified the transfer as
/// something other than SUCCESS.
#[derive(Debug, Clone, Serialize)]
pub struct TransferView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub sender: AccountView,
    pub receiver: AccountView,
    pub amount: Decimal,
    pub description: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraud_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraud_description: Option<String>,
}

impl TransferView {
    fn from_transfer(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id,
            sender: AccountView::from_account(&transfer.sender),
            receiver: AccountView::from_account(&transfer.receiver),
            amount: transfer.amount,
            description: transfer.description.clone(),
            status: transfer
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            fraud_code: transfer.fraud_reason.map(|r| r.code().to_string()),
            fraud_description: transfer.fraud_reason.map(|r| r.description().to_string()),
        }
    }
}

/// Transfer workflow service
pub struct TransferService {
    transfers: Arc<dyn TransferStore>,
    screener: TransferScreener,
}

impl TransferService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        transfers: Arc<dyn TransferStore>,
        blacklist: Arc<dyn Blacklist>,
    ) -> Self {
        let screener = TransferScreener::new(directory, Arc::clone(&transfers), blacklist);
        Self { transfers, screener }
    }

    /// Screen and persist an inbound transfer
    pub fn submit(&self, request: TransferRequest) -> Result<TransferView> {
        let mut transfer = request.into_transfer();
        self.screener.classify(&mut transfer)?;

        let saved = self.transfers.save(transfer)?;
        let id = saved.id.map(|id| id.to_string()).unwrap_or_default();

        match saved.status {
            Some(TransferStatus::Success) => {
                info!(transfer_id = %id, "Transfer approved");
            }
            Some(status) => {
                warn!(
                    transfer_id = %id,
                    status = %status,
                    reason = ?saved.fraud_reason,
                    "Transfer screened out"
                );
            }
            None => {}
        }

        Ok(TransferView::from_transfer(&saved))
    }

    pub fn find(&self, id: Uuid) -> Result<Option<TransferView>> {
        Ok(self
            .transfers
            .find_by_id(id)?
            .map(|t| TransferView::from_transfer(&t)))
    }

    pub fn list(&self) -> Result<Vec<TransferView>> {
        Ok(self
            .transfers
            .find_all()?
            .iter()
            .map(TransferView::from_transfer)
            .collect())
    }

    /// Transfers with the given status label, newest first
    pub fn list_by_status(&self, status: &str) -> Result<Vec<TransferView>> {
        let parsed = TransferStatus::parse(status)
            .ok_or_else(|| Error::UnknownStatus(status.to_string()))?;

        Ok(self
            .transfers
            .find_by_status(parsed)?
            .iter()
            .map(TransferView::from_transfer)
            .collect())
    }

    /// Analyst override: approve a transfer, clearing its fraud reason
    pub fn approve(&self, id: Uuid) -> Result<TransferView> {
        let mut transfer = self.require(id)?;

        transfer.approve();

        let saved = self.transfers.update(transfer)?;
        info!(transfer_id = %id, "Transfer approved by analyst");
        Ok(TransferView::from_transfer(&saved))
    }

    /// Analyst override: reject a transfer
    ///
    /// The automated fraud reason is discarded, not archived.
    pub fn reject(&self, id: Uuid) -> Result<TransferView> {
        let mut transfer = self.require(id)?;

        transfer.status = Some(TransferStatus::Failed);
        transfer.fraud_reason = None;
        transfer.updated_at = Utc::now();

        let saved = self.transfers.update(transfer)?;
        info!(transfer_id = %id, "Transfer rejected by analyst");
        Ok(TransferView::from_transfer(&saved))
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        if self.transfers.find_by_id(id)?.is_none() {
            warn!(transfer_id = %id, "Delete failed: transfer not found");
            return Err(Error::NotFound(id));
        }

        self.transfers.delete(id)?;
        info!(transfer_id = %id, "Transfer deleted");
        Ok(())
    }

    fn require(&self, id: Uuid) -> Result<Transfer> {
        self.transfers.find_by_id(id)?.ok_or(Error::NotFound(id))
    }
}
