//! Core types and data structures for the token ledger and sale

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, globally unique identity of a holder, a token or a sale
///
/// Two distinct identities never alias the same holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(Uuid);

impl Identity {
    /// Generate a fresh random identity
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this is the all-zero identity
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.simple())
    }
}

/// Descriptive token metadata, no behavioral effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Standard label, e.g. "RC Token v1.0"
    pub standard: String,
}

impl TokenMetadata {
    /// Create token metadata
    pub fn new(name: String, symbol: String, standard: String) -> Self {
        Self {
            name,
            symbol,
            standard,
        }
    }
}

/// Events emitted by successful mutating operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    /// Ledger units moved between holders
    Transfer {
        from: Identity,
        to: Identity,
        amount: u128,
    },
    /// An owner set a spender's allowance
    Approval {
        owner: Identity,
        spender: Identity,
        amount: u128,
    },
    /// A buyer purchased units from a sale
    Sell { buyer: Identity, amount: u128 },
    /// A sale was closed and its assets swept to the admin
    SaleEnded {
        admin: Identity,
        unsold_units: u128,
        proceeds: u128,
    },
}

impl Event {
    /// Short name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Transfer { .. } => "Transfer",
            Event::Approval { .. } => "Approval",
            Event::Sell { .. } => "Sell",
            Event::SaleEnded { .. } => "SaleEnded",
        }
    }
}

/// Immutable record of an emitted event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier of this record
    pub id: Uuid,
    /// Position in the emitter's log, starting at 0
    pub sequence: u64,
    /// Address of the token or sale that emitted the event
    pub emitter: Identity,
    /// The event payload
    pub event: Event,
    /// When the event was recorded
    pub recorded_at: NaiveDateTime,
}

/// Result of a successful mutating call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Events emitted by the called component, in order
    pub logs: Vec<EventRecord>,
}

impl Receipt {
    /// Receipt carrying a single event record
    pub fn single(record: EventRecord) -> Self {
        Self { logs: vec![record] }
    }

    /// The first event, if any
    pub fn event(&self) -> Option<&Event> {
        self.logs.first().map(|record| &record.event)
    }
}

/// Open/closed state of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleState {
    /// Accepting purchases
    Open,
    /// Finalized; terminal
    Closed,
}

/// Report on total supply conservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyReport {
    pub total_supply: u128,
    pub sum_of_balances: u128,
    pub holder_count: usize,
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// Snapshot of a sale's figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleReport {
    pub sale: Identity,
    pub token_contract: Identity,
    pub state: SaleState,
    pub token_price: u128,
    pub tokens_sold: u128,
    pub tokens_available: u128,
    /// Native currency currently held by the sale
    pub proceeds: u128,
    /// `token_price` in major currency units
    pub token_price_major: BigDecimal,
    /// `proceeds` in major currency units
    pub proceeds_major: BigDecimal,
}

/// Errors that can occur in the ledger and sale
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient balance: {holder} holds {available}, requested {requested}")]
    InsufficientBalance {
        holder: Identity,
        available: u128,
        requested: u128,
    },
    #[error(
        "Insufficient allowance: {spender} may move {available} for {owner}, requested {requested}"
    )]
    InsufficientAllowance {
        owner: Identity,
        spender: Identity,
        available: u128,
        requested: u128,
    },
    #[error("Payment mismatch: expected {expected:?}, paid {paid}")]
    PaymentMismatch { expected: Option<u128>, paid: u128 },
    #[error("Insufficient supply: {available} available, requested {requested}")]
    InsufficientSupply { available: u128, requested: u128 },
    #[error("Unauthorized caller: {caller}")]
    Unauthorized { caller: Identity },
    #[error("Sale already closed")]
    AlreadyClosed,
    #[error("Insufficient funds: {holder} holds {available}, requested {requested}")]
    InsufficientFunds {
        holder: Identity,
        available: u128,
        requested: u128,
    },
    #[error("Token mismatch: sale is bound to {expected}, got {actual}")]
    TokenMismatch { expected: Identity, actual: Identity },
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display_is_hex() {
        let id = Identity::from_uuid(Uuid::nil());
        assert!(id.is_nil());
        assert_eq!(id.to_string(), format!("0x{}", "0".repeat(32)));
        assert!(!Identity::generate().is_nil());
    }

    #[test]
    fn test_event_serializes_with_kind_tag() {
        let event = Event::Sell {
            buyer: Identity::generate(),
            amount: 10,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "Sell");
        assert_eq!(event.kind(), "Sell");
    }
}
