use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Money;

/// opaque identifier of a loan (e.g. "L48583")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// opaque identifier of a user account (e.g. "A652DE4K")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// requested or offered, no money has moved
    Unfunded,
    /// principal transferred, installments outstanding
    Funded,
    /// every installment paid
    Completed,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoanStatus::Unfunded => "UNFUNDED",
            LoanStatus::Funded => "FUNDED",
            LoanStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

/// result of a funding attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingOutcome {
    /// investor paid principal plus fee, borrower received principal
    Funded {
        principal: Money,
        fee: Money,
        scheduled_payment: Money,
    },
    /// borrower turned the offer down
    DeclinedByBorrower,
    /// investor could not cover principal plus fee
    InsufficientInvestorFunds {
        available: Money,
        required: Money,
    },
}

impl FundingOutcome {
    pub fn is_funded(&self) -> bool {
        matches!(self, FundingOutcome::Funded { .. })
    }
}

/// result of one repayment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// installment transferred, more remain
    PaymentApplied {
        amount: Money,
        remaining_periods: u32,
    },
    /// final installment transferred
    Completed {
        final_payment: Money,
    },
    /// borrower balance below the installment; nothing changed
    InsufficientBorrowerFunds {
        available: Money,
        required: Money,
    },
}

impl PaymentOutcome {
    /// true when money moved
    pub fn is_applied(&self) -> bool {
        !matches!(self, PaymentOutcome::InsufficientBorrowerFunds { .. })
    }
}
