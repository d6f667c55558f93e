//! Ledger domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Processing state of a submitted order.
///
/// The state machine is monotonic: `New` → `Processing` → (`Processed` |
/// `Invalid`). `Processed` and `Invalid` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Submitted, not yet known to the accrual service.
    New,
    /// Known to the accrual service, reward not yet final.
    Processing,
    /// The accrual service rejected the order; no reward.
    Invalid,
    /// Reward calculated and credited.
    Processed,
}

impl OrderStatus {
    /// Returns the canonical wire/storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
        }
    }

    /// Whether no further transition can occur.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credit-side ledger entry: one submitted order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    /// The order number.
    pub number: String,
    /// Processing status.
    pub status: OrderStatus,
    /// Reward amount; present only once the order is `Processed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Decimal>,
    /// When the order was submitted. Immutable.
    pub uploaded_at: DateTime<Utc>,
}

/// A debit-side ledger entry: one withdrawal against an order number.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalRecord {
    /// The order number the withdrawal was spent against.
    pub order: String,
    /// Amount withdrawn.
    pub sum: Decimal,
    /// When the withdrawal was applied.
    pub processed_at: DateTime<Utc>,
}

/// A user's balance projection.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BalanceSummary {
    /// Live balance: accruals minus withdrawals.
    pub current: Decimal,
    /// Lifetime total withdrawn, aggregated over withdrawal records.
    pub withdrawn: Decimal,
}

/// Result of submitting an order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The order was newly accepted for processing.
    Accepted,
    /// The caller already submitted this number; nothing changed.
    AlreadyUploaded,
}
