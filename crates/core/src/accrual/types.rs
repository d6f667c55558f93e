//! Accrual service wire types and response classification.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::ledger::OrderStatus;

/// Status values the accrual service reports for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatus {
    /// Registered, reward not yet calculated.
    Registered,
    /// Reward calculation in progress.
    Processing,
    /// Order rejected; no reward will be paid.
    Invalid,
    /// Reward calculated.
    Processed,
}

impl AccrualStatus {
    /// Maps the upstream status onto the ledger's order status.
    ///
    /// `REGISTERED` and `PROCESSING` both mean "not final yet" and map to
    /// `PROCESSING`; the terminal states map one to one.
    #[must_use]
    pub const fn into_order_status(self) -> OrderStatus {
        match self {
            Self::Registered | Self::Processing => OrderStatus::Processing,
            Self::Invalid => OrderStatus::Invalid,
            Self::Processed => OrderStatus::Processed,
        }
    }
}

/// Response body of a successful accrual lookup.
#[derive(Debug, Deserialize)]
struct AccrualReply {
    #[allow(dead_code)]
    order: String,
    status: AccrualStatus,
    accrual: Option<Decimal>,
}

/// The reward state of an order as the ledger sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualSnapshot {
    /// Ledger status derived from the upstream reply.
    pub status: OrderStatus,
    /// Reward amount; zero unless the order is `Processed`.
    pub accrual: Decimal,
}

impl AccrualSnapshot {
    /// Snapshot for an order the accrual service does not know yet.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            status: OrderStatus::New,
            accrual: Decimal::ZERO,
        }
    }
}

/// Failure modes of an accrual lookup. All are transient.
#[derive(Debug, Clone, Error)]
pub enum AccrualError {
    /// HTTP 429; back off before retrying.
    #[error("accrual service rate limited the request")]
    RateLimited {
        /// Seconds to wait, from the `Retry-After` header when present.
        retry_after_secs: Option<u64>,
    },

    /// HTTP 5xx from the accrual service.
    #[error("accrual service unavailable: {0}")]
    Unavailable(String),

    /// Transport failure: connection refused, timeout, DNS.
    #[error("accrual service unreachable: {0}")]
    Unreachable(String),

    /// A 2xx reply whose body could not be interpreted.
    #[error("accrual service returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Classifies an accrual service HTTP response.
///
/// Pure function over the status code, the parsed `Retry-After` seconds,
/// and the raw body; the transport-level failures are handled by the
/// client before this point.
///
/// # Errors
///
/// See [`AccrualError`] for the mapping of 429/5xx/undecodable bodies.
pub fn classify_response(
    status_code: u16,
    retry_after_secs: Option<u64>,
    body: &[u8],
) -> Result<AccrualSnapshot, AccrualError> {
    match status_code {
        200 => {
            let reply: AccrualReply = serde_json::from_slice(body)
                .map_err(|e| AccrualError::InvalidResponse(e.to_string()))?;
            Ok(AccrualSnapshot {
                status: reply.status.into_order_status(),
                accrual: reply.accrual.unwrap_or(Decimal::ZERO),
            })
        }
        204 => Ok(AccrualSnapshot::pending()),
        429 => Err(AccrualError::RateLimited {
            retry_after_secs,
        }),
        code if code >= 500 => Err(AccrualError::Unavailable(format!("HTTP {code}"))),
        code => Err(AccrualError::InvalidResponse(format!(
            "unexpected HTTP {code}"
        ))),
    }
}
