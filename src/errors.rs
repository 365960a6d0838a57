use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{AccountId, FundingOutcome, LoanStatus};

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid term: {periods} periods, must be at least 1")]
    InvalidTerm {
        periods: u32,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidRate {
        rate: Rate,
    },

    #[error("invalid principal: {amount}, must be greater than zero")]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("loan not funded: current status is {status}")]
    NotFunded {
        status: LoanStatus,
    },

    #[error("funding already attempted: {outcome:?}")]
    FundingAlreadyAttempted {
        outcome: FundingOutcome,
    },

    #[error("invalid state: current {current}, expected {expected}")]
    InvalidState {
        current: LoanStatus,
        expected: LoanStatus,
    },

    #[error("borrower and investor must be different accounts: {account_id}")]
    SameParty {
        account_id: AccountId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("input error: {message}")]
    Input {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoanError>;
