use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::serialization::LoanView;
use crate::types::{LoanId, LoanStatus};

/// terms proposed during origination, before any money moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub principal: Money,
    pub period_months: u32,
    pub annual_rate: Option<Rate>,
}

/// loan state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanState {
    pub loan_id: LoanId,
    pub status: LoanStatus,

    // funded terms; zero while unfunded and again after completion
    pub principal: Money,
    pub period_months: u32,
    pub term_months: u32,
    pub annual_rate: Rate,
    pub scheduled_payment: Money,
    pub origination_fee: Money,

    // origination
    pub proposal: Option<Proposal>,
    pub offer_accepted: bool,

    // repayment tracking
    pub payments_made: u32,
    pub total_repaid: Money,

    // dates
    pub created_at: DateTime<Utc>,
    pub funded_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_status_change: DateTime<Utc>,
}

impl LoanState {
    pub fn new(loan_id: LoanId, origination_fee: Money, created_at: DateTime<Utc>) -> Self {
        Self {
            loan_id,
            status: LoanStatus::Unfunded,
            principal: Money::ZERO,
            period_months: 0,
            term_months: 0,
            annual_rate: Rate::ZERO,
            scheduled_payment: Money::ZERO,
            origination_fee,
            proposal: None,
            offer_accepted: false,
            payments_made: 0,
            total_repaid: Money::ZERO,
            created_at,
            funded_at: None,
            completed_at: None,
            last_status_change: created_at,
        }
    }

    pub fn update_status(&mut self, new_status: LoanStatus, timestamp: DateTime<Utc>) {
        self.status = new_status;
        self.last_status_change = timestamp;
    }

    /// record the terms a successful funding fixed
    pub fn record_funding(
        &mut self,
        principal: Money,
        period_months: u32,
        annual_rate: Rate,
        scheduled_payment: Money,
        timestamp: DateTime<Utc>,
    ) {
        self.principal = principal;
        self.period_months = period_months;
        self.term_months = period_months;
        self.annual_rate = annual_rate;
        self.scheduled_payment = scheduled_payment;
        self.funded_at = Some(timestamp);
        self.update_status(LoanStatus::Funded, timestamp);
    }

    /// record one installment; returns remaining periods
    pub fn record_payment(&mut self, amount: Money) -> u32 {
        self.period_months = self.period_months.saturating_sub(1);
        self.payments_made += 1;
        self.total_repaid += amount;
        self.period_months
    }

    /// closing snapshot: principal, rate and payment reset to zero
    pub fn close(&mut self, timestamp: DateTime<Utc>) {
        self.principal = Money::ZERO;
        self.annual_rate = Rate::ZERO;
        self.scheduled_payment = Money::ZERO;
        self.completed_at = Some(timestamp);
        self.update_status(LoanStatus::Completed, timestamp);
    }
}

/// state snapshot for audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub snapshot_id: Uuid,
    pub loan_id: LoanId,
    pub timestamp: DateTime<Utc>,
    pub trigger: String,
    pub view: LoanView,
}

impl StateSnapshot {
    pub fn capture(view: LoanView, trigger: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            loan_id: view.loan_id.clone(),
            timestamp,
            trigger: trigger.into(),
            view,
        }
    }
}
