/// read-only views of a loan for rendering
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::decimal::{Money, Rate};
use crate::loan::Loan;
use crate::state::Proposal;
use crate::types::{AccountId, LoanId, LoanStatus};

/// serializable view of a loan after a transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_id: LoanId,
    pub status: LoanStatus,
    pub borrower: PartyView,
    pub investor: PartyView,
    pub principal: Money,
    /// None before funding
    pub period_months: Option<u32>,
    /// None while zero
    pub annual_rate: Option<Rate>,
    /// None while zero
    pub scheduled_payment: Option<Money>,
    pub proposal: Option<Proposal>,
    pub payments_made: u32,
    pub total_repaid: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyView {
    pub id: AccountId,
    pub name: String,
    pub balance: Money,
}

impl PartyView {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            balance: account.balance(),
        }
    }
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        let state = loan.state();

        LoanView {
            loan_id: state.loan_id.clone(),
            status: state.status,
            borrower: PartyView::from_account(loan.borrower()),
            investor: PartyView::from_account(loan.investor()),
            principal: state.principal,
            period_months: match state.status {
                LoanStatus::Unfunded => None,
                _ => Some(state.period_months),
            },
            annual_rate: (!state.annual_rate.is_zero()).then_some(state.annual_rate),
            scheduled_payment: (!state.scheduled_payment.is_zero()).then_some(state.scheduled_payment),
            proposal: state.proposal,
            payments_made: state.payments_made,
            total_repaid: state.total_repaid,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
