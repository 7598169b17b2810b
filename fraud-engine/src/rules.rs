//! Ordered fraud rule chain
//!
//! Evaluation order is data (`RULE_CHAIN`), not control flow. Each rule may
//! set the transfer's status and reason as a side effect; the evaluator
//! stops at the first rule that does. Reordering the chain changes
//! externally observable classifications (a transfer that is both over the
//! value bound and from a blacklisted sender must report USER_IN_BLACKLIST)
//! and is a behavioral regression, not a refactor.

use crate::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use transfer_core::{Account, Blacklist, FraudReason, Transfer, TransferStore};

/// Inclusive upper bound for a single transfer (10000.00)
const TRANSFER_MAX_VALUE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Inclusive lower bound for a single transfer (0.50)
const TRANSFER_MIN_VALUE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Tolerance factor around the receiver's recent average
const AVERAGE_TOLERANCE_FACTOR: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Window for the high-frequency check
const FREQUENCY_WINDOW_MINUTES: i64 = 5;

/// Received-transfer count that trips the high-frequency check
const FREQUENCY_LIMIT: usize = 5;

/// Minimum history size before the average-deviation check applies
const MIN_HISTORY_FOR_AVERAGE: usize = 5;

/// Terms that flag a description or PIX key for manual review
const DANGEROUS_TERMS: [&str; 4] = ["golpe", "fraude", "fake", "urgente"];

/// The individual fraud rules, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Sender or receiver is blacklisted
    UserBlacklist,
    /// Amount outside the fixed bounds
    ValueBounds,
    /// Too many transfers received within the frequency window
    HighFrequency,
    /// Amount deviates from the receiver's recent average
    AverageDeviation,
    /// Description contains a dangerous term
    SuspiciousDescription,
    /// Sender or receiver PIX key contains a dangerous term
    SuspiciousKeys,
}

/// Fixed evaluation order of the rule chain
pub const RULE_CHAIN: [RuleKind; 6] = [
    RuleKind::UserBlacklist,
    RuleKind::ValueBounds,
    RuleKind::HighFrequency,
    RuleKind::AverageDeviation,
    RuleKind::SuspiciousDescription,
    RuleKind::SuspiciousKeys,
];

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::UserBlacklist => "user_blacklist",
            RuleKind::ValueBounds => "value_bounds",
            RuleKind::HighFrequency => "high_frequency",
            RuleKind::AverageDeviation => "average_deviation",
            RuleKind::SuspiciousDescription => "suspicious_description",
            RuleKind::SuspiciousKeys => "suspicious_keys",
        }
    }

    /// Whether the rule reads the receiver's transfer history
    fn needs_history(&self) -> bool {
        matches!(self, RuleKind::HighFrequency | RuleKind::AverageDeviation)
    }
}

/// Runs the rule chain against a transfer
pub struct RuleChain {
    blacklist: Arc<dyn Blacklist>,
}

impl RuleChain {
    pub fn new(blacklist: Arc<dyn Blacklist>) -> Self {
        Self { blacklist }
    }

    /// Evaluate the chain, stopping at the first rule that classifies the
    /// transfer. A transfer untouched by every rule is approved.
    ///
    /// The receiver's history is fetched at most once per pass, immediately
    /// before the first rule that needs it, and shared by the frequency and
    /// deviation rules.
    pub fn evaluate(&self, transfer: &mut Transfer, transfers: &dyn TransferStore) -> Result<()> {
        let now = Utc::now();
        let mut history: Option<Vec<Transfer>> = None;

        for rule in RULE_CHAIN {
            if rule.needs_history() && history.is_none() {
                history = Some(match transfer.receiver.id {
                    Some(receiver_id) => transfers.recent_received_by(receiver_id)?,
                    None => Vec::new(),
                });
            }

            self.apply(rule, transfer, history.as_deref().unwrap_or(&[]), now)?;

            if transfer.is_classified() {
                debug!(
                    rule = rule.name(),
                    status = ?transfer.status,
                    reason = ?transfer.fraud_reason,
                    "Rule classified transfer"
                );
                return Ok(());
            }
        }

        transfer.approve();
        Ok(())
    }

    fn apply(
        &self,
        rule: RuleKind,
        transfer: &mut Transfer,
        history: &[Transfer],
        now: DateTime<Utc>,
    ) -> Result<()> {
        match rule {
            RuleKind::UserBlacklist => self.check_blacklist(transfer),
            RuleKind::ValueBounds => self.check_value_bounds(transfer, now),
            RuleKind::HighFrequency => self.check_high_frequency(transfer, history, now),
            RuleKind::AverageDeviation => {
                Self::check_average_deviation(transfer, history);
                Ok(())
            }
            RuleKind::SuspiciousDescription => {
                Self::check_description(transfer);
                Ok(())
            }
            RuleKind::SuspiciousKeys => {
                Self::check_keys(transfer);
                Ok(())
            }
        }
    }

    fn check_blacklist(&self, transfer: &mut Transfer) -> Result<()> {
        if self.is_blacklisted(&transfer.sender)? || self.is_blacklisted(&transfer.receiver)? {
            transfer.fail(FraudReason::UserInBlacklist);
        }
        Ok(())
    }

    fn check_value_bounds(&self, transfer: &mut Transfer, now: DateTime<Utc>) -> Result<()> {
        if transfer.amount > TRANSFER_MAX_VALUE || transfer.amount < TRANSFER_MIN_VALUE {
            transfer.fail(FraudReason::StrangeValue);
            // The receiving account absorbs the penalty, by policy
            self.blacklist_account(&transfer.receiver, now)?;
        }
        Ok(())
    }

    fn check_high_frequency(
        &self,
        transfer: &mut Transfer,
        history: &[Transfer],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let recent = history
            .iter()
            .filter(|t| (now - t.created_at).num_minutes() <= FREQUENCY_WINDOW_MINUTES)
            .count();

        if recent >= FREQUENCY_LIMIT {
            transfer.fail(FraudReason::HighFrequency);
            self.blacklist_account(&transfer.receiver, now)?;
        }
        Ok(())
    }

    fn check_average_deviation(transfer: &mut Transfer, history: &[Transfer]) {
        if history.len() < MIN_HISTORY_FOR_AVERAGE {
            return;
        }

        let total: Decimal = history.iter().map(|t| t.amount).sum();
        let average = total / Decimal::from(history.len() as u64);

        let upper_limit = average * AVERAGE_TOLERANCE_FACTOR;
        let lower_limit = average / AVERAGE_TOLERANCE_FACTOR;

        if transfer.amount > upper_limit || transfer.amount < lower_limit {
            transfer.fail(FraudReason::OutOfAverageValue);
        }
    }

    fn check_description(transfer: &mut Transfer) {
        let normalized = transfer.description.to_lowercase();

        if DANGEROUS_TERMS.iter().any(|term| normalized.contains(term)) {
            transfer.flag_for_review(FraudReason::SuspiciousDescription);
        }
    }

    fn check_keys(transfer: &mut Transfer) {
        let sender_key = transfer.sender.pix_key.to_lowercase();
        let receiver_key = transfer.receiver.pix_key.to_lowercase();

        let found = DANGEROUS_TERMS
            .iter()
            .any(|term| sender_key.contains(term) || receiver_key.contains(term));

        if found {
            transfer.flag_for_review(FraudReason::SuspiciousPixKey);
        }
    }

    /// An account with no identifier is not yet persisted and is treated as
    /// blacklisted (fail-closed)
    fn is_blacklisted(&self, account: &Account) -> Result<bool> {
        match account.id {
            Some(id) => Ok(self.blacklist.contains(id)?),
            None => Ok(true),
        }
    }

    fn blacklist_account(&self, account: &Account, now: DateTime<Utc>) -> Result<()> {
        if let Some(id) = account.id {
            self.blacklist.add(id, now)?;
        }
        Ok(())
    }
}
