//! Vendor contract model
//!
//! Contracts are attached to a category and travel with it when the category
//! is merged into another one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ContractId;
use super::money::Money;

/// Lifecycle state of a vendor contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    #[default]
    Pending,
    Signed,
    Paid,
    Cancelled,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Signed => write!(f, "signed"),
            Self::Paid => write!(f, "paid"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "signed" => Ok(Self::Signed),
            "paid" => Ok(Self::Paid),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown contract status: {}", other)),
        }
    }
}

/// A vendor contract recorded against a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub name: String,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ContractStatus,
}

impl Contract {
    /// Create a pending contract
    pub fn new(name: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: ContractId::new(),
            name: name.into(),
            amount,
            date,
            status: ContractStatus::Pending,
        }
    }

    /// Set the status
    pub fn with_status(mut self, status: ContractStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether this contract still commits money
    pub fn is_active(&self) -> bool {
        self.status != ContractStatus::Cancelled
    }
}
