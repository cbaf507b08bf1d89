use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a trade instruction asks the executor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    /// Acquire exactly `amount` of `asset`, paying with the counterparty
    Buy,
    /// Dispose of `amount` of `asset` for the counterparty (or the quote token)
    Sell,
    /// Exchange `amount` of `asset` for the counterparty
    Swap,
    /// Transfer `amount` of `asset` to `recipient`
    Send,
    /// Nothing to do
    NoOp,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "buy"),
            TradeKind::Sell => write!(f, "sell"),
            TradeKind::Swap => write!(f, "swap"),
            TradeKind::Send => write!(f, "send"),
            TradeKind::NoOp => write!(f, "noop"),
        }
    }
}

/// A single trade for the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInstruction {
    pub kind: TradeKind,
    pub asset: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl TradeInstruction {
    pub fn no_op(asset: impl Into<String>) -> Self {
        Self {
            kind: TradeKind::NoOp,
            asset: asset.into(),
            amount: Decimal::ZERO,
            counterparty: None,
            recipient: None,
        }
    }

    pub fn buy(asset: impl Into<String>, amount: Decimal, pay_with: Option<String>) -> Self {
        Self {
            kind: TradeKind::Buy,
            asset: asset.into(),
            amount,
            counterparty: pay_with,
            recipient: None,
        }
    }

    pub fn sell(asset: impl Into<String>, amount: Decimal, receive: Option<String>) -> Self {
        Self {
            kind: TradeKind::Sell,
            asset: asset.into(),
            amount,
            counterparty: receive,
            recipient: None,
        }
    }

    pub fn swap(asset: impl Into<String>, amount: Decimal, into: impl Into<String>) -> Self {
        Self {
            kind: TradeKind::Swap,
            asset: asset.into(),
            amount,
            counterparty: Some(into.into()),
            recipient: None,
        }
    }

    pub fn send(asset: impl Into<String>, amount: Decimal, recipient: impl Into<String>) -> Self {
        Self {
            kind: TradeKind::Send,
            asset: asset.into(),
            amount,
            counterparty: None,
            recipient: Some(recipient.into()),
        }
    }

    pub fn is_no_op(&self) -> bool {
        self.kind == TradeKind::NoOp
    }
}

impl fmt::Display for TradeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.counterparty, &self.recipient) {
            (TradeKind::NoOp, _, _) => write!(f, "no-op"),
            (TradeKind::Send, _, Some(to)) => write!(f, "send {} {} -> {}", self.amount, self.asset, to),
            (TradeKind::Buy, Some(cp), _) => write!(f, "buy {} {} with {}", self.amount, self.asset, cp),
            (kind, Some(cp), _) => write!(f, "{} {} {} -> {}", kind, self.amount, self.asset, cp),
            (kind, None, _) => write!(f, "{} {} {}", kind, self.amount, self.asset),
        }
    }
}

/// Identifier returned by the chain for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
