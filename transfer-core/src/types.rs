//! Core types for transfer screening
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money)
//! - Memory safety (no unsafe code)
//! - Serde-friendly wire representation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Display name assigned to accounts provisioned from a never-seen PIX key
pub const UNKNOWN_USER_NAME: &str = "Usuário não localizado";

/// Tax-id sentinel for provisioned accounts whose key is not a CPF
pub const UNKNOWN_TAX_ID: &str = "CPF não localizado";

/// Legally recognized PIX key types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PixKeyType {
    /// National tax id (CPF)
    Cpf,
    /// E-mail address
    Email,
    /// Phone number
    Phone,
    /// Random token issued by the central bank
    Random,
}

impl PixKeyType {
    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            PixKeyType::Cpf => "CPF",
            PixKeyType::Email => "EMAIL",
            PixKeyType::Phone => "PHONE",
            PixKeyType::Random => "RANDOM",
        }
    }

    /// Parse from wire code (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CPF" => Some(PixKeyType::Cpf),
            "EMAIL" => Some(PixKeyType::Email),
            "PHONE" => Some(PixKeyType::Phone),
            "RANDOM" => Some(PixKeyType::Random),
            _ => None,
        }
    }
}

impl fmt::Display for PixKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An account addressed by its PIX key
///
/// `id` is `None` until the directory persists the account. Fields are
/// immutable after creation in this scope; only the directory that
/// provisions an account fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Directory-assigned identifier (`None` until persisted)
    pub id: Option<Uuid>,

    /// Display name
    pub name: String,

    /// National tax id, or [`UNKNOWN_TAX_ID`]
    pub tax_id: String,

    /// PIX key value
    pub pix_key: String,

    /// PIX key type
    pub key_type: PixKeyType,
}

impl Account {
    /// Build a pre-resolution stub carrying only a key and its type
    pub fn stub(pix_key: impl Into<String>, key_type: PixKeyType) -> Self {
        Self {
            id: None,
            name: String::new(),
            tax_id: String::new(),
            pix_key: pix_key.into(),
            key_type,
        }
    }

    /// Whether the directory has assigned an identifier
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Terminal classification of a screened transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Approved by the rule chain or an analyst
    Success,
    /// Rejected
    Failed,
    /// Flagged for manual review
    PendingReview,
}

impl TransferStatus {
    /// Stable wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failed => "FAILED",
            TransferStatus::PendingReview => "PENDING_REVIEW",
        }
    }

    /// Parse from wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SUCCESS" => Some(TransferStatus::Success),
            "FAILED" => Some(TransferStatus::Failed),
            "PENDING_REVIEW" => Some(TransferStatus::PendingReview),
            _ => None,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed catalogue of fraud reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudReason {
    /// Amount outside the accepted bounds
    StrangeValue,
    /// PIX key contains a suspicious term
    SuspiciousPixKey,
    /// Too many transfers received in a short window
    HighFrequency,
    /// Amount deviates from the receiver's recent average
    OutOfAverageValue,
    /// Description contains a suspicious term
    SuspiciousDescription,
    /// Sender or receiver is blacklisted
    UserInBlacklist,
}

impl FraudReason {
    /// Stable machine code
    pub fn code(&self) -> &'static str {
        match self {
            FraudReason::StrangeValue => "STRANGE_VALUE",
            FraudReason::SuspiciousPixKey => "SUSPICIOUS_PIX_KEY",
            FraudReason::HighFrequency => "HIGH_FREQUENCY",
            FraudReason::OutOfAverageValue => "OUT_OF_AVERAGE_VALUE",
            FraudReason::SuspiciousDescription => "SUSPICIOUS_DESCRIPTION",
            FraudReason::UserInBlacklist => "USER_IN_BLACKLIST",
        }
    }

    /// Human description
    pub fn description(&self) -> &'static str {
        match self {
            FraudReason::StrangeValue => "Valor da transação é atípico ou muito alto",
            FraudReason::SuspiciousPixKey => "Chave PIX contém palavra suspeita",
            FraudReason::HighFrequency => {
                "Muitas transações em um curto período de tempo (5 min)"
            }
            FraudReason::OutOfAverageValue => "Valor fora da média das últimas 5 transações",
            FraudReason::SuspiciousDescription => {
                "Descrição contém termos suspeitos ou proibidos"
            }
            FraudReason::UserInBlacklist => "Remetente ou destinatário presente em blacklist",
        }
    }
}

impl fmt::Display for FraudReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A PIX transfer between two accounts
///
/// Built by the caller before screening; the rule chain mutates `status`
/// and `fraud_reason` in place, at most once per pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Store-assigned identifier (`None` until persisted)
    pub id: Option<Uuid>,

    /// Sending account
    pub sender: Account,

    /// Receiving account
    pub receiver: Account,

    /// Monetary amount (non-negative)
    pub amount: Decimal,

    /// Free-text description
    pub description: String,

    /// Classification (`None` until screened)
    pub status: Option<TransferStatus>,

    /// Reason set by the rule that classified the transfer
    pub fraud_reason: Option<FraudReason>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last-modified timestamp
    pub updated_at: DateTime<Utc>,
}

impl Transfer {
    /// Create an unclassified transfer
    pub fn new(
        sender: Account,
        receiver: Account,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            sender,
            receiver,
            amount,
            description: description.into(),
            status: None,
            fraud_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a screening pass has assigned a status
    pub fn is_classified(&self) -> bool {
        self.status.is_some()
    }

    /// Reject the transfer with the given reason
    pub fn fail(&mut self, reason: FraudReason) {
        self.status = Some(TransferStatus::Failed);
        self.fraud_reason = Some(reason);
        self.updated_at = Utc::now();
    }

    /// Flag the transfer for manual review with the given reason
    pub fn flag_for_review(&mut self, reason: FraudReason) {
        self.status = Some(TransferStatus::PendingReview);
        self.fraud_reason = Some(reason);
        self.updated_at = Utc::now();
    }

    /// Approve the transfer, clearing any fraud reason
    pub fn approve(&mut self) {
        self.status = Some(TransferStatus::Success);
        self.fraud_reason = None;
        self.updated_at = Utc::now();
    }
}

/// Append-only record of a blacklisted account
///
/// References the account by id; does not own it. Presence of at least one
/// entry for an account id constitutes "blacklisted".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// Entry identifier
    pub id: Uuid,

    /// Referenced account
    pub account_id: Uuid,

    /// Timestamp of listing
    pub listed_at: DateTime<Utc>,
}

impl BlacklistEntry {
    /// Create a new entry for the given account
    pub fn new(account_id: Uuid, listed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            listed_at,
        }
    }
}
