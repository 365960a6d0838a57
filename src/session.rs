use hourglass_rs::SafeTimeProvider;
use tracing::info;

use crate::errors::Result;
use crate::input::LoanInput;
use crate::loan::{FundingRequest, Loan};
use crate::types::{FundingOutcome, LoanStatus, PaymentOutcome};

/// drives one loan from request to completion using an input adapter
pub struct LoanSession<I: LoanInput> {
    loan: Loan,
    input: I,
}

impl<I: LoanInput> LoanSession<I> {
    pub fn new(loan: Loan, input: I) -> Self {
        Self { loan, input }
    }

    /// request, offer, acceptance, then the single funding attempt
    pub fn originate(&mut self, time_provider: &SafeTimeProvider) -> Result<FundingOutcome> {
        let terms = self.input.request_loan_terms()?;
        self.loan.note_request(terms, time_provider)?;

        let annual_rate = self.input.request_offer(&terms)?;
        self.loan.note_offer(annual_rate, time_provider)?;

        let accepts = self.input.request_acceptance(&terms, annual_rate)?;

        self.loan
            .request_funding(FundingRequest::new(terms, annual_rate, accepts), time_provider)
    }

    /// one repayment period
    pub fn advance_period(&mut self, time_provider: &SafeTimeProvider) -> Result<PaymentOutcome> {
        self.loan.advance_period(time_provider)
    }

    /// advance until completed or `max_periods` attempts have been made
    pub fn run_to_completion(
        &mut self,
        max_periods: u32,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<PaymentOutcome>> {
        let mut outcomes = Vec::new();

        for _ in 0..max_periods {
            if self.loan.status() != LoanStatus::Funded {
                break;
            }
            outcomes.push(self.loan.advance_period(time_provider)?);
        }

        info!(
            loan_id = %self.loan.id,
            attempts = outcomes.len(),
            status = %self.loan.status(),
            "repayment run finished"
        );

        Ok(outcomes)
    }

    pub fn loan(&self) -> &Loan {
        &self.loan
    }

    pub fn loan_mut(&mut self) -> &mut Loan {
        &mut self.loan
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn into_loan(self) -> Loan {
        self.loan
    }
}
