use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{AccountId, LoanId, LoanStatus};

/// all events that can be emitted by a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // origination events
    LoanRequested {
        loan_id: LoanId,
        borrower_id: AccountId,
        principal: Money,
        period_months: u32,
        timestamp: DateTime<Utc>,
    },
    OfferSubmitted {
        loan_id: LoanId,
        investor_id: AccountId,
        annual_rate: Rate,
        timestamp: DateTime<Utc>,
    },
    OfferDeclined {
        loan_id: LoanId,
        annual_rate: Rate,
        timestamp: DateTime<Utc>,
    },
    LoanFunded {
        loan_id: LoanId,
        principal: Money,
        fee: Money,
        scheduled_payment: Money,
        timestamp: DateTime<Utc>,
    },
    FundingFailed {
        loan_id: LoanId,
        available: Money,
        required: Money,
        timestamp: DateTime<Utc>,
    },

    // repayment events
    PaymentApplied {
        loan_id: LoanId,
        amount: Money,
        remaining_periods: u32,
        timestamp: DateTime<Utc>,
    },
    PaymentMissed {
        loan_id: LoanId,
        expected_amount: Money,
        available: Money,
        timestamp: DateTime<Utc>,
    },
    LoanCompleted {
        loan_id: LoanId,
        total_repaid: Money,
        timestamp: DateTime<Utc>,
    },

    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
