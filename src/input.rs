use serde::{Deserialize, Serialize};

use crate::config::LoanDefaults;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::payments::amortization::MAX_PERIODS;

/// amount and term requested by the borrower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub period_months: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, period_months: u32) -> Self {
        Self {
            principal,
            period_months,
        }
    }

    /// domain bounds only; numeric parsing is the adapter's job
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LoanError::InvalidPrincipal {
                amount: self.principal,
            });
        }
        if self.period_months == 0 || self.period_months > MAX_PERIODS {
            return Err(LoanError::InvalidTerm {
                periods: self.period_months,
            });
        }
        Ok(())
    }
}

/// supplies borrower and investor decisions during origination; the loan
/// itself never reads from a console
pub trait LoanInput {
    /// borrower: how much, for how many months
    fn request_loan_terms(&mut self) -> Result<LoanTerms>;

    /// investor: annual rate offered for the requested terms
    fn request_offer(&mut self, terms: &LoanTerms) -> Result<Rate>;

    /// borrower: accept or decline the offered rate
    fn request_acceptance(&mut self, terms: &LoanTerms, annual_rate: Rate) -> Result<bool>;
}

/// fixed answers, for tests and non-interactive runs
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedInput {
    pub terms: LoanTerms,
    pub annual_rate: Rate,
    pub accept: bool,
}

impl ScriptedInput {
    pub fn new(terms: LoanTerms, annual_rate: Rate, accept: bool) -> Self {
        Self {
            terms,
            annual_rate,
            accept,
        }
    }

    /// answer every prompt with its configured default
    pub fn from_defaults(defaults: &LoanDefaults) -> Self {
        Self {
            terms: LoanTerms::new(defaults.principal, defaults.period_months),
            annual_rate: defaults.annual_rate,
            accept: defaults.accept_offer,
        }
    }
}

impl LoanInput for ScriptedInput {
    fn request_loan_terms(&mut self) -> Result<LoanTerms> {
        Ok(self.terms)
    }

    fn request_offer(&mut self, _terms: &LoanTerms) -> Result<Rate> {
        Ok(self.annual_rate)
    }

    fn request_acceptance(&mut self, _terms: &LoanTerms, _annual_rate: Rate) -> Result<bool> {
        Ok(self.accept)
    }
}
