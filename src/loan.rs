use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{info, warn};

use crate::account::{self, Account, Transfer};
use crate::config::LoanConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::input::LoanTerms;
use crate::payments::{AmortizationCalculator, AmortizationSchedule};
use crate::serialization::LoanView;
use crate::state::{LoanState, Proposal, StateSnapshot};
use crate::types::{FundingOutcome, LoanId, LoanStatus, PaymentOutcome};

/// everything the borrower and investor agreed (or not) during origination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingRequest {
    pub principal: Money,
    pub period_months: u32,
    pub annual_rate: Rate,
    pub borrower_accepts: bool,
}

impl FundingRequest {
    pub fn new(terms: LoanTerms, annual_rate: Rate, borrower_accepts: bool) -> Self {
        Self {
            principal: terms.principal,
            period_months: terms.period_months,
            annual_rate,
            borrower_accepts,
        }
    }
}

/// a single peer-to-peer loan between one borrower and one investor
#[derive(Debug)]
pub struct Loan {
    pub id: LoanId,
    config: LoanConfig,
    borrower: Account,
    investor: Account,
    state: LoanState,
    calculator: AmortizationCalculator,
    funding_outcome: Option<FundingOutcome>,
    events: EventStore,
    snapshots: Vec<StateSnapshot>,
}

impl Loan {
    /// open an unfunded loan between two distinct accounts
    pub fn new(
        id: LoanId,
        borrower: Account,
        investor: Account,
        config: LoanConfig,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        config.validate()?;

        if borrower.id == investor.id {
            return Err(LoanError::SameParty {
                account_id: borrower.id,
            });
        }

        let state = LoanState::new(id.clone(), config.origination_fee, time_provider.now());
        let calculator = AmortizationCalculator::new(config.periods_per_year);

        let mut loan = Self {
            id,
            config,
            borrower,
            investor,
            state,
            calculator,
            funding_outcome: None,
            events: EventStore::new(),
            snapshots: Vec::new(),
        };

        loan.capture("loan created", time_provider);
        Ok(loan)
    }

    /// open with system time
    pub fn new_now(
        id: LoanId,
        borrower: Account,
        investor: Account,
        config: LoanConfig,
    ) -> Result<Self> {
        let time = SafeTimeProvider::new(TimeSource::System);
        Self::new(id, borrower, investor, config, &time)
    }

    /// record the borrower's requested amount and term
    pub fn note_request(&mut self, terms: LoanTerms, time_provider: &SafeTimeProvider) -> Result<()> {
        self.ensure_open()?;
        terms.validate()?;

        self.state.proposal = Some(Proposal {
            principal: terms.principal,
            period_months: terms.period_months,
            annual_rate: None,
        });

        self.events.emit(Event::LoanRequested {
            loan_id: self.id.clone(),
            borrower_id: self.borrower.id.clone(),
            principal: terms.principal,
            period_months: terms.period_months,
            timestamp: time_provider.now(),
        });
        self.capture("loan requested", time_provider);
        Ok(())
    }

    /// record the investor's rate offer against the current request
    pub fn note_offer(&mut self, annual_rate: Rate, time_provider: &SafeTimeProvider) -> Result<()> {
        self.ensure_open()?;
        self.validate_rate(annual_rate)?;

        let proposal = self.state.proposal.as_mut().ok_or_else(|| LoanError::Input {
            message: "offer submitted before a loan request".to_string(),
        })?;
        proposal.annual_rate = Some(annual_rate);

        self.events.emit(Event::OfferSubmitted {
            loan_id: self.id.clone(),
            investor_id: self.investor.id.clone(),
            annual_rate,
            timestamp: time_provider.now(),
        });
        self.capture("offer submitted", time_provider);
        Ok(())
    }

    /// attempt to fund the loan; the only funding attempt this loan gets
    pub fn request_funding(
        &mut self,
        request: FundingRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<FundingOutcome> {
        self.ensure_open()?;
        let scheduled_payment = self.validate_request(&request)?;

        let now = time_provider.now();

        if !request.borrower_accepts {
            info!(loan_id = %self.id, rate = %request.annual_rate, "offer declined by borrower");
            self.events.emit(Event::OfferDeclined {
                loan_id: self.id.clone(),
                annual_rate: request.annual_rate,
                timestamp: now,
            });
            return Ok(self.conclude_funding(
                FundingOutcome::DeclinedByBorrower,
                "offer declined",
                time_provider,
            ));
        }
        self.state.offer_accepted = true;

        let leg = Transfer::with_fee(request.principal, self.config.origination_fee);

        if !self.investor.can_cover(leg.debit) {
            let available = self.investor.balance();
            warn!(
                loan_id = %self.id,
                available = %available,
                required = %leg.debit,
                "investor has insufficient balance"
            );
            self.events.emit(Event::FundingFailed {
                loan_id: self.id.clone(),
                available,
                required: leg.debit,
                timestamp: now,
            });
            let outcome = FundingOutcome::InsufficientInvestorFunds {
                available,
                required: leg.debit,
            };
            return Ok(self.conclude_funding(outcome, "insufficient investor funds", time_provider));
        }

        account::transfer(&mut self.investor, &mut self.borrower, leg);

        let old_status = self.state.status;
        self.state.record_funding(
            request.principal,
            request.period_months,
            request.annual_rate,
            scheduled_payment,
            now,
        );

        info!(
            loan_id = %self.id,
            principal = %request.principal,
            periods = request.period_months,
            payment = %scheduled_payment,
            "loan funded"
        );

        self.events.emit(Event::LoanFunded {
            loan_id: self.id.clone(),
            principal: request.principal,
            fee: leg.fee(),
            scheduled_payment,
            timestamp: now,
        });
        self.emit_status_change(old_status, now);

        let outcome = FundingOutcome::Funded {
            principal: request.principal,
            fee: leg.fee(),
            scheduled_payment,
        };
        Ok(self.conclude_funding(outcome, "loan funded", time_provider))
    }

    /// fund with system time
    pub fn request_funding_now(&mut self, request: FundingRequest) -> Result<FundingOutcome> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.request_funding(request, &time)
    }

    /// collect one installment; call exactly once per period
    pub fn advance_period(&mut self, time_provider: &SafeTimeProvider) -> Result<PaymentOutcome> {
        if self.state.status != LoanStatus::Funded {
            return Err(LoanError::NotFunded {
                status: self.state.status,
            });
        }

        let now = time_provider.now();
        let payment = self.state.scheduled_payment;

        if !self.borrower.can_cover(payment) {
            let available = self.borrower.balance();
            warn!(
                loan_id = %self.id,
                available = %available,
                required = %payment,
                "borrower has insufficient funds for this period"
            );
            self.events.emit(Event::PaymentMissed {
                loan_id: self.id.clone(),
                expected_amount: payment,
                available,
                timestamp: now,
            });
            return Ok(PaymentOutcome::InsufficientBorrowerFunds {
                available,
                required: payment,
            });
        }

        account::transfer(&mut self.borrower, &mut self.investor, Transfer::exact(payment));
        let remaining_periods = self.state.record_payment(payment);

        self.events.emit(Event::PaymentApplied {
            loan_id: self.id.clone(),
            amount: payment,
            remaining_periods,
            timestamp: now,
        });

        if remaining_periods > 0 {
            info!(loan_id = %self.id, amount = %payment, remaining_periods, "payment applied");
            self.capture(format!("payment {}", self.state.payments_made), time_provider);
            return Ok(PaymentOutcome::PaymentApplied {
                amount: payment,
                remaining_periods,
            });
        }

        let old_status = self.state.status;
        self.state.close(now);

        info!(loan_id = %self.id, total_repaid = %self.state.total_repaid, "loan completed");
        self.events.emit(Event::LoanCompleted {
            loan_id: self.id.clone(),
            total_repaid: self.state.total_repaid,
            timestamp: now,
        });
        self.emit_status_change(old_status, now);
        self.capture("loan completed", time_provider);

        Ok(PaymentOutcome::Completed {
            final_payment: payment,
        })
    }

    /// collect one installment with system time
    pub fn advance_period_now(&mut self) -> Result<PaymentOutcome> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.advance_period(&time)
    }

    pub fn status(&self) -> LoanStatus {
        self.state.status
    }

    pub fn state(&self) -> &LoanState {
        &self.state
    }

    pub fn config(&self) -> &LoanConfig {
        &self.config
    }

    pub fn borrower(&self) -> &Account {
        &self.borrower
    }

    pub fn investor(&self) -> &Account {
        &self.investor
    }

    /// borrower account for deposits made outside the loan
    pub fn borrower_mut(&mut self) -> &mut Account {
        &mut self.borrower
    }

    /// outcome of the funding attempt, if one was made
    pub fn funding_outcome(&self) -> Option<FundingOutcome> {
        self.funding_outcome
    }

    /// unfunded for good: the single funding attempt failed
    pub fn is_closed(&self) -> bool {
        matches!(self.funding_outcome, Some(outcome) if !outcome.is_funded())
    }

    /// amortization preview for the funded terms, built on demand
    pub fn schedule(&self) -> Result<AmortizationSchedule> {
        if self.state.status != LoanStatus::Funded {
            return Err(LoanError::NotFunded {
                status: self.state.status,
            });
        }
        self.calculator
            .schedule(self.state.principal, self.state.annual_rate, self.state.term_months)
    }

    /// current read-only view
    pub fn snapshot(&self) -> LoanView {
        LoanView::from_loan(self)
    }

    /// one snapshot per transition, oldest first
    pub fn snapshots(&self) -> &[StateSnapshot] {
        &self.snapshots
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// release both accounts, consuming the loan
    pub fn into_accounts(self) -> (Account, Account) {
        (self.borrower, self.investor)
    }

    /// get json representation of current state
    pub fn to_json_pretty(&self) -> String {
        self.snapshot()
            .to_json_pretty()
            .unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.status != LoanStatus::Unfunded {
            return Err(LoanError::InvalidState {
                current: self.state.status,
                expected: LoanStatus::Unfunded,
            });
        }
        if let Some(outcome) = self.funding_outcome {
            return Err(LoanError::FundingAlreadyAttempted { outcome });
        }
        Ok(())
    }

    /// bounds check plus the installment the request would fix
    fn validate_request(&self, request: &FundingRequest) -> Result<Money> {
        LoanTerms {
            principal: request.principal,
            period_months: request.period_months,
        }
        .validate()?;
        self.validate_rate(request.annual_rate)?;
        self.calculator
            .payment(request.principal, request.annual_rate, request.period_months)
    }

    fn validate_rate(&self, rate: Rate) -> Result<()> {
        if rate.is_negative() || rate >= self.config.max_annual_rate {
            return Err(LoanError::InvalidRate { rate });
        }
        Ok(())
    }

    fn conclude_funding(
        &mut self,
        outcome: FundingOutcome,
        trigger: &str,
        time_provider: &SafeTimeProvider,
    ) -> FundingOutcome {
        self.funding_outcome = Some(outcome);
        self.capture(trigger, time_provider);
        outcome
    }

    fn emit_status_change(&mut self, old_status: LoanStatus, timestamp: DateTime<Utc>) {
        info!(loan_id = %self.id, from = %old_status, to = %self.state.status, "status changed");
        self.events.emit(Event::StatusChanged {
            loan_id: self.id.clone(),
            old_status,
            new_status: self.state.status,
            timestamp,
        });
    }

    fn capture(&mut self, trigger: impl Into<String>, time_provider: &SafeTimeProvider) {
        let view = self.snapshot();
        self.snapshots
            .push(StateSnapshot::capture(view, trigger, time_provider.now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::amortization::MAX_PERIODS;
    use crate::types::AccountId;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn borrower(balance: i64) -> Account {
        Account::new(AccountId::new("A652DE4K"), "Kenny", 26, Money::from_major(balance))
    }

    fn investor(balance: i64) -> Account {
        Account::new(AccountId::new("ASFKWI12"), "John", 35, Money::from_major(balance))
    }

    fn loan(borrower_balance: i64, investor_balance: i64, time: &SafeTimeProvider) -> Loan {
        Loan::new(
            LoanId::new("L48583"),
            borrower(borrower_balance),
            investor(investor_balance),
            LoanConfig::monthly(),
            time,
        )
        .unwrap()
    }

    fn standard_request(accepts: bool) -> FundingRequest {
        FundingRequest {
            principal: Money::from_major(5_000),
            period_months: 6,
            annual_rate: Rate::from_percentage(15),
            borrower_accepts: accepts,
        }
    }

    #[test]
    fn test_rejects_same_party() {
        let time = test_time();
        let result = Loan::new(
            LoanId::new("L1"),
            borrower(100),
            Account::new(AccountId::new("A652DE4K"), "Kenny", 26, Money::from_major(100)),
            LoanConfig::monthly(),
            &time,
        );
        assert!(matches!(result, Err(LoanError::SameParty { .. })));
    }

    #[test]
    fn test_new_loan_is_unfunded() {
        let time = test_time();
        let loan = loan(2_000, 10_000, &time);

        assert_eq!(loan.status(), LoanStatus::Unfunded);
        assert!(loan.state().principal.is_zero());
        assert!(loan.state().annual_rate.is_zero());
        assert!(loan.state().scheduled_payment.is_zero());
        assert!(loan.funding_outcome().is_none());
        assert!(!loan.is_closed());
        assert_eq!(loan.snapshots().len(), 1);
    }

    #[test]
    fn test_successful_funding() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        let outcome = loan.request_funding(standard_request(true), &time).unwrap();

        let expected_payment = match outcome {
            FundingOutcome::Funded {
                principal,
                fee,
                scheduled_payment,
            } => {
                assert_eq!(principal, Money::from_major(5_000));
                assert_eq!(fee, Money::from_major(3));
                scheduled_payment
            }
            other => panic!("expected funded outcome, got {:?}", other),
        };

        assert_eq!(loan.status(), LoanStatus::Funded);
        assert_eq!(loan.investor().balance(), Money::from_major(4_997));
        assert_eq!(loan.borrower().balance(), Money::from_major(7_000));
        assert_eq!(loan.state().principal, Money::from_major(5_000));
        assert_eq!(loan.state().period_months, 6);
        assert_eq!(loan.state().scheduled_payment, expected_payment);
        assert_eq!(
            expected_payment.round_dp(2),
            Money::from_decimal(dec!(870.17))
        );
        assert!(loan.state().offer_accepted);
        assert!(!loan.is_closed());

        let schedule = loan.schedule().unwrap();
        assert_eq!(schedule.periods, 6);
        assert!(schedule.payments.iter().all(|p| p.payment_amount == expected_payment));
    }

    #[test]
    fn test_declined_offer_changes_nothing() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);
        let before = (loan.borrower().balance(), loan.investor().balance());

        let outcome = loan.request_funding(standard_request(false), &time).unwrap();

        assert_eq!(outcome, FundingOutcome::DeclinedByBorrower);
        assert_eq!(loan.status(), LoanStatus::Unfunded);
        assert_eq!((loan.borrower().balance(), loan.investor().balance()), before);
        assert!(loan.state().scheduled_payment.is_zero());
        assert!(loan.state().principal.is_zero());
        assert!(!loan.state().offer_accepted);
        assert!(matches!(loan.schedule(), Err(LoanError::NotFunded { .. })));
        assert!(loan.is_closed());
        assert!(loan
            .events()
            .iter()
            .any(|e| matches!(e, Event::OfferDeclined { .. })));
    }

    #[test]
    fn test_insufficient_investor_funds() {
        let time = test_time();
        let mut loan = loan(2_000, 100, &time);

        let outcome = loan.request_funding(standard_request(true), &time).unwrap();

        assert_eq!(
            outcome,
            FundingOutcome::InsufficientInvestorFunds {
                available: Money::from_major(100),
                required: Money::from_major(5_003),
            }
        );
        assert_eq!(loan.status(), LoanStatus::Unfunded);
        assert_eq!(loan.investor().balance(), Money::from_major(100));
        assert_eq!(loan.borrower().balance(), Money::from_major(2_000));
        assert!(loan.is_closed());
        // the borrower did accept; only the investor fell short
        assert!(loan.state().offer_accepted);
    }

    #[test]
    fn test_fee_must_be_covered_too() {
        let time = test_time();
        // enough for principal, three short of the fee
        let mut loan = loan(0, 5_000, &time);

        let outcome = loan.request_funding(standard_request(true), &time).unwrap();
        assert!(matches!(outcome, FundingOutcome::InsufficientInvestorFunds { .. }));

        // exactly principal + fee is enough
        let mut loan = self::loan(0, 5_003, &time);
        let outcome = loan.request_funding(standard_request(true), &time).unwrap();
        assert!(outcome.is_funded());
        assert_eq!(loan.investor().balance(), Money::ZERO);
    }

    #[test]
    fn test_single_funding_attempt() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        loan.request_funding(standard_request(false), &time).unwrap();
        let retry = loan.request_funding(standard_request(true), &time);

        assert!(matches!(
            retry,
            Err(LoanError::FundingAlreadyAttempted {
                outcome: FundingOutcome::DeclinedByBorrower
            })
        ));
        assert_eq!(loan.investor().balance(), Money::from_major(10_000));

        let mut funded = self::loan(2_000, 10_000, &time);
        funded.request_funding(standard_request(true), &time).unwrap();
        assert!(matches!(
            funded.request_funding(standard_request(true), &time),
            Err(LoanError::InvalidState {
                current: LoanStatus::Funded,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_requests_do_not_consume_attempt() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        let mut zero_principal = standard_request(true);
        zero_principal.principal = Money::ZERO;
        assert!(matches!(
            loan.request_funding(zero_principal, &time),
            Err(LoanError::InvalidPrincipal { .. })
        ));

        let mut zero_term = standard_request(true);
        zero_term.period_months = 0;
        assert!(matches!(
            loan.request_funding(zero_term, &time),
            Err(LoanError::InvalidTerm { periods: 0 })
        ));

        let mut full_rate = standard_request(true);
        full_rate.annual_rate = Rate::ONE;
        assert!(matches!(
            loan.request_funding(full_rate, &time),
            Err(LoanError::InvalidRate { .. })
        ));

        let mut negative_rate = standard_request(true);
        negative_rate.annual_rate = Rate::from_decimal(dec!(-0.05));
        assert!(matches!(
            loan.request_funding(negative_rate, &time),
            Err(LoanError::InvalidRate { .. })
        ));

        assert!(loan.funding_outcome().is_none());
        assert_eq!(loan.investor().balance(), Money::from_major(10_000));
        assert!(loan.request_funding(standard_request(true), &time).unwrap().is_funded());
    }

    #[test]
    fn test_huge_term_is_rejected_without_moving_money() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        for annual_rate in [Rate::ZERO, Rate::from_percentage(15)] {
            let mut request = standard_request(true);
            request.period_months = u32::MAX;
            request.annual_rate = annual_rate;
            assert!(matches!(
                loan.request_funding(request, &time),
                Err(LoanError::InvalidTerm { periods: u32::MAX })
            ));
        }

        assert_eq!(loan.status(), LoanStatus::Unfunded);
        assert!(loan.funding_outcome().is_none());
        assert_eq!(loan.investor().balance(), Money::from_major(10_000));
        assert_eq!(loan.borrower().balance(), Money::from_major(2_000));

        // longest allowed term still funds and previews
        let mut request = standard_request(true);
        request.period_months = MAX_PERIODS;
        assert!(loan.request_funding(request, &time).unwrap().is_funded());
        assert_eq!(loan.schedule().unwrap().payments.len(), MAX_PERIODS as usize);
    }

    #[test]
    fn test_dust_principal_is_rejected_before_funding() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        let request = FundingRequest {
            principal: Money::from_decimal(dec!(0.00000001)),
            period_months: 3,
            annual_rate: Rate::ZERO,
            borrower_accepts: true,
        };
        assert!(matches!(
            loan.request_funding(request, &time),
            Err(LoanError::CalculationError { .. })
        ));

        assert_eq!(loan.status(), LoanStatus::Unfunded);
        assert!(loan.state().scheduled_payment.is_zero());
        assert!(loan.funding_outcome().is_none());
        assert_eq!(loan.investor().balance(), Money::from_major(10_000));
        assert_eq!(loan.borrower().balance(), Money::from_major(2_000));
    }

    #[test]
    fn test_advance_before_funding_is_rejected() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        assert!(matches!(
            loan.advance_period(&time),
            Err(LoanError::NotFunded {
                status: LoanStatus::Unfunded
            })
        ));
        assert_eq!(loan.borrower().balance(), Money::from_major(2_000));
    }

    #[test]
    fn test_full_repayment() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);
        loan.request_funding(standard_request(true), &time).unwrap();

        let payment = loan.state().scheduled_payment;

        for month in 1..=5u32 {
            let borrower_before = loan.borrower().balance();
            let investor_before = loan.investor().balance();

            let outcome = loan.advance_period(&time).unwrap();

            assert_eq!(
                outcome,
                PaymentOutcome::PaymentApplied {
                    amount: payment,
                    remaining_periods: 6 - month,
                }
            );
            assert_eq!(loan.borrower().balance(), borrower_before - payment);
            assert_eq!(loan.investor().balance(), investor_before + payment);
            assert_eq!(loan.state().period_months, 6 - month);
            // payment is frozen as the term shrinks
            assert_eq!(loan.state().scheduled_payment, payment);
        }

        let outcome = loan.advance_period(&time).unwrap();
        assert_eq!(outcome, PaymentOutcome::Completed { final_payment: payment });

        assert_eq!(loan.status(), LoanStatus::Completed);
        assert_eq!(loan.state().period_months, 0);
        assert!(loan.state().principal.is_zero());
        assert!(loan.state().annual_rate.is_zero());
        assert!(loan.state().scheduled_payment.is_zero());
        assert_eq!(loan.state().payments_made, 6);
        assert_eq!(loan.state().total_repaid, payment * rust_decimal::Decimal::from(6));

        assert_eq!(
            loan.borrower().balance(),
            Money::from_major(7_000) - payment * rust_decimal::Decimal::from(6)
        );
        assert_eq!(
            loan.investor().balance(),
            Money::from_major(4_997) + payment * rust_decimal::Decimal::from(6)
        );

        // nothing moves after completion
        let balances = (loan.borrower().balance(), loan.investor().balance());
        assert!(matches!(
            loan.advance_period(&time),
            Err(LoanError::NotFunded {
                status: LoanStatus::Completed
            })
        ));
        assert_eq!((loan.borrower().balance(), loan.investor().balance()), balances);
    }

    #[test]
    fn test_insufficient_borrower_funds_then_retry() {
        let time = test_time();
        let mut loan = Loan::new(
            LoanId::new("L2"),
            borrower(0),
            investor(10_000),
            LoanConfig::fee_free(),
            &time,
        )
        .unwrap();

        // two installments of ~507.51 cost more than the 1000 received
        loan.request_funding(
            FundingRequest {
                principal: Money::from_major(1_000),
                period_months: 2,
                annual_rate: Rate::from_percentage(12),
                borrower_accepts: true,
            },
            &time,
        )
        .unwrap();
        let payment = loan.state().scheduled_payment;
        assert_eq!(payment.round_dp(2), Money::from_decimal(dec!(507.51)));

        assert!(loan.advance_period(&time).unwrap().is_applied());

        let borrower_before = loan.borrower().balance();
        let investor_before = loan.investor().balance();

        let outcome = loan.advance_period(&time).unwrap();
        assert_eq!(
            outcome,
            PaymentOutcome::InsufficientBorrowerFunds {
                available: borrower_before,
                required: payment,
            }
        );
        assert_eq!(loan.status(), LoanStatus::Funded);
        assert_eq!(loan.state().period_months, 1);
        assert_eq!(loan.borrower().balance(), borrower_before);
        assert_eq!(loan.investor().balance(), investor_before);
        assert_eq!(loan.state().payments_made, 1);
        assert_eq!(loan.state().total_repaid, payment);
        assert!(matches!(
            loan.events().last(),
            Some(Event::PaymentMissed { expected_amount, available, .. })
                if *expected_amount == payment && *available == borrower_before
        ));

        // borrower tops up outside the loan, then the same period succeeds
        loan.borrower_mut().deposit(Money::from_major(100)).unwrap();

        let outcome = loan.advance_period(&time).unwrap();
        assert_eq!(outcome, PaymentOutcome::Completed { final_payment: payment });
        assert_eq!(loan.state().period_months, 0);
        assert_eq!(loan.state().payments_made, 2);
        assert_eq!(loan.investor().balance(), investor_before + payment);
        assert_eq!(
            loan.borrower().balance(),
            borrower_before + Money::from_major(100) - payment
        );
    }

    #[test]
    fn test_zero_rate_loan() {
        let time = test_time();
        let mut loan = Loan::new(
            LoanId::new("L3"),
            borrower(0),
            investor(10_000),
            LoanConfig::fee_free(),
            &time,
        )
        .unwrap();

        loan.request_funding(
            FundingRequest {
                principal: Money::from_major(1_000),
                period_months: 2,
                annual_rate: Rate::ZERO,
                borrower_accepts: true,
            },
            &time,
        )
        .unwrap();
        assert_eq!(loan.state().scheduled_payment, Money::from_major(500));
        assert_eq!(loan.investor().balance(), Money::from_major(9_000));
        assert_eq!(loan.snapshot().annual_rate, None);

        assert!(loan.advance_period(&time).unwrap().is_applied());
        assert!(loan.advance_period(&time).unwrap().is_applied());
        assert_eq!(loan.status(), LoanStatus::Completed);
        assert_eq!(loan.borrower().balance(), Money::ZERO);
        assert_eq!(loan.investor().balance(), Money::from_major(10_000));
    }

    #[test]
    fn test_events_and_snapshots() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        loan.note_request(
            LoanTerms {
                principal: Money::from_major(5_000),
                period_months: 6,
            },
            &time,
        )
        .unwrap();
        loan.note_offer(Rate::from_percentage(15), &time).unwrap();
        loan.request_funding(standard_request(true), &time).unwrap();
        loan.advance_period(&time).unwrap();

        let triggers: Vec<&str> = loan.snapshots().iter().map(|s| s.trigger.as_str()).collect();
        assert_eq!(
            triggers,
            vec!["loan created", "loan requested", "offer submitted", "loan funded", "payment 1"]
        );

        let funded_view = &loan.snapshots()[3].view;
        assert_eq!(funded_view.status, LoanStatus::Funded);
        assert_eq!(funded_view.period_months, Some(6));
        assert_eq!(funded_view.annual_rate, Some(Rate::from_percentage(15)));
        assert_eq!(funded_view.investor.balance, Money::from_major(4_997));

        let created_view = &loan.snapshots()[0].view;
        assert_eq!(created_view.period_months, None);
        assert_eq!(created_view.annual_rate, None);
        assert_eq!(created_view.scheduled_payment, None);

        let events = loan.take_events();
        assert!(matches!(events[0], Event::LoanRequested { .. }));
        assert!(matches!(events[1], Event::OfferSubmitted { .. }));
        assert!(matches!(events[2], Event::LoanFunded { .. }));
        assert!(matches!(
            events[3],
            Event::StatusChanged {
                old_status: LoanStatus::Unfunded,
                new_status: LoanStatus::Funded,
                ..
            }
        ));
        assert!(matches!(events[4], Event::PaymentApplied { remaining_periods: 5, .. }));
        assert!(loan.events().is_empty());
    }

    #[test]
    fn test_offer_requires_request() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);

        assert!(matches!(
            loan.note_offer(Rate::from_percentage(15), &time),
            Err(LoanError::Input { .. })
        ));
    }

    #[test]
    fn test_json_view() {
        let time = test_time();
        let mut loan = loan(2_000, 10_000, &time);
        loan.request_funding(standard_request(true), &time).unwrap();

        let json = loan.to_json_pretty();
        assert!(json.contains("\"loan_id\": \"L48583\""));
        assert!(json.contains("\"status\": \"FUNDED\""));
    }
}
