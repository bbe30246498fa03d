//! Core types for risk engine

use crate::error::{Error, Result, ValidationError};
use crate::request_id::RequestId;
use crate::vote::Vote;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network identifier (upper-cased, e.g. `ETH`, `TRON`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chain(String);

impl Chain {
    /// Parse and normalise a chain identifier
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        let well_formed = (2..=16).contains(&normalized.len())
            && normalized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !well_formed {
            return Err(ValidationError::Chain(raw.to_string()).into());
        }
        Ok(Self(normalized))
    }

    /// Normalised identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Chain {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        chain.0
    }
}

/// On-chain address
///
/// Hex-prefixed addresses (`0x...`) compare case-insensitively and are stored
/// lower-cased. Other encodings (base58, bech32) are case-sensitive and kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalise an address
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (hex_prefixed, body) = match trimmed.get(..2) {
            Some("0x") | Some("0X") => (true, &trimmed[2..]),
            _ => (false, trimmed),
        };

        let well_formed = (3..=128).contains(&trimmed.len())
            && !body.is_empty()
            && body.chars().all(|c| c.is_ascii_alphanumeric());
        if !well_formed {
            return Err(ValidationError::Address(raw.to_string()).into());
        }

        if hex_prefixed {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Normalised address
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Unvalidated transfer request as received from a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIntent {
    /// Target network
    pub chain: String,
    /// Sending address
    pub from_address: String,
    /// Destination address
    pub to_address: String,
    /// USD-equivalent value
    #[serde(alias = "amount_usdt")]
    pub amount: Decimal,
}

/// Validated, immutable transfer request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIntent")]
pub struct TransactionIntent {
    chain: Chain,
    from_address: Address,
    to_address: Address,
    amount: Decimal,
}

impl TransactionIntent {
    /// Validate and build an intent
    pub fn new(chain: &str, from_address: &str, to_address: &str, amount: Decimal) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::Amount(amount.to_string()).into());
        }

        Ok(Self {
            chain: Chain::parse(chain)?,
            from_address: Address::parse(from_address)?,
            to_address: Address::parse(to_address)?,
            amount: amount.normalize(),
        })
    }

    /// Target network
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Sending address
    pub fn from_address(&self) -> &Address {
        &self.from_address
    }

    /// Destination address
    pub fn to_address(&self) -> &Address {
        &self.to_address
    }

    /// USD-equivalent value (normalised, always positive)
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl TryFrom<RawIntent> for TransactionIntent {
    type Error = Error;

    fn try_from(raw: RawIntent) -> Result<Self> {
        Self::new(&raw.chain, &raw.from_address, &raw.to_address, raw.amount)
    }
}

/// Aggregate risk score, clamped to `[0, max_score]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(u32);

impl RiskScore {
    /// Zero score
    pub const ZERO: RiskScore = RiskScore(0);

    /// Wrap a raw score
    pub fn new(score: u32) -> Self {
        Self(score)
    }

    /// Get raw score
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse risk bucket derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
    /// Above every configured threshold
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Final verdict on a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Forward
    Allow,
    /// Forward, flagged for review
    Review,
    /// Do not forward unless forced
    Block,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Allow => "ALLOW",
            Decision::Review => "REVIEW",
            Decision::Block => "BLOCK",
        };
        f.write_str(s)
    }
}

/// Address list kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListKind {
    /// Deny list
    Blacklist,
    /// Allow list
    Whitelist,
}

impl ListKind {
    /// Both kinds, in display order
    pub const ALL: [ListKind; 2] = [ListKind::Blacklist, ListKind::Whitelist];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Blacklist => "BLACKLIST",
            ListKind::Whitelist => "WHITELIST",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLACKLIST" => Ok(ListKind::Blacklist),
            "WHITELIST" => Ok(ListKind::Whitelist),
            _ => Err(Error::InvalidListKind(s.to_string())),
        }
    }
}

/// Read-only view of address list membership
///
/// Implementations must answer every lookup of one assessment from the same
/// consistent state.
pub trait ListView {
    /// Whether `(chain, address)` is on the list of the given kind
    fn contains(&self, kind: ListKind, chain: &Chain, address: &Address) -> bool;
}

/// Outcome of one assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Deterministic request identifier
    pub request_id: RequestId,

    /// Aggregate weighted score
    pub score: RiskScore,

    /// Level derived from the score
    pub level: RiskLevel,

    /// Final decision
    pub decision: Decision,

    /// Reason codes of every vote that fired, in evaluation order
    pub reason_codes: Vec<String>,

    /// Every signal vote, in evaluation order
    pub votes: Vec<Vote>,
}
