//! Account resolution by PIX key

use crate::Result;
use std::sync::Arc;
use tracing::debug;
use transfer_core::types::{UNKNOWN_TAX_ID, UNKNOWN_USER_NAME};
use transfer_core::{Account, PixKeyType, UserDirectory};

/// Resolves transfer parties against the account directory
///
/// Resolution always succeeds: a never-seen PIX key provisions a minimal
/// placeholder account. Resolving the same key twice returns the same
/// stored account, never a duplicate.
pub struct AccountResolver {
    directory: Arc<dyn UserDirectory>,
}

impl AccountResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Return the stored account for the stub's key, provisioning a
    /// placeholder on first sight
    pub fn resolve(&self, stub: &Account) -> Result<Account> {
        if let Some(existing) = self.directory.find_by_key(&stub.pix_key)? {
            return Ok(existing);
        }

        // A CPF key is itself the tax id; any other key type leaves it unknown
        let tax_id = match stub.key_type {
            PixKeyType::Cpf => stub.pix_key.clone(),
            _ => UNKNOWN_TAX_ID.to_string(),
        };

        let account = Account {
            id: None,
            name: UNKNOWN_USER_NAME.to_string(),
            tax_id,
            pix_key: stub.pix_key.clone(),
            key_type: stub.key_type,
        };

        debug!(pix_key = %account.pix_key, "Provisioning placeholder account");
        Ok(self.directory.create(account)?)
    }
}
