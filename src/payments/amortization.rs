use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// longest term the calculator accepts (100 years of monthly installments)
pub const MAX_PERIODS: u32 = 1_200;

/// one installment in an amortization schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
}

/// amortization schedule
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub periods: u32,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// get payment for specific period (1-based)
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        payment_number
            .checked_sub(1)
            .and_then(|i| self.payments.get(i as usize))
    }

    /// remaining principal after the given installment
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.ending_balance)
            .unwrap_or(self.principal)
    }
}

/// equal-installment amortization calculator
#[derive(Debug, Clone, Copy)]
pub struct AmortizationCalculator {
    periods_per_year: u32,
}

impl Default for AmortizationCalculator {
    fn default() -> Self {
        Self::monthly()
    }
}

impl AmortizationCalculator {
    pub fn new(periods_per_year: u32) -> Self {
        Self { periods_per_year }
    }

    pub fn monthly() -> Self {
        Self::new(12)
    }

    /// fixed installment repaying `principal` over `periods` at `annual_rate`
    ///
    /// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), or P / n when r is zero
    pub fn payment(&self, principal: Money, annual_rate: Rate, periods: u32) -> Result<Money> {
        if !principal.is_positive() {
            return Err(LoanError::InvalidPrincipal { amount: principal });
        }
        let r = self.periodic_rate(annual_rate, periods)?;

        let payment = if r.is_zero() {
            principal / Decimal::from(periods)
        } else {
            self.compounded_payment(principal, r, annual_rate, periods)?
        };

        // an installment that rounds to nothing would never repay the principal
        if !payment.is_positive() {
            return Err(LoanError::CalculationError {
                message: format!(
                    "installment for {} over {} periods rounds to {}",
                    principal, periods, payment
                ),
            });
        }
        Ok(payment)
    }

    fn compounded_payment(
        &self,
        principal: Money,
        r: Decimal,
        annual_rate: Rate,
        periods: u32,
    ) -> Result<Money> {
        let compound = compound_factor(r, periods)?;
        let denominator = compound - Decimal::ONE;
        if denominator.is_zero() {
            return Err(LoanError::CalculationError {
                message: format!("rate {} too small to amortize over {} periods", annual_rate, periods),
            });
        }

        let numerator = principal
            .as_decimal()
            .checked_mul(r * compound)
            .ok_or_else(|| overflow(principal, periods))?;

        Ok(Money::from_decimal(numerator / denominator))
    }

    /// full installment breakdown
    ///
    /// every row charges the same installment that is actually collected; the
    /// last row repays the remaining balance and books the rounding residue
    /// as interest
    pub fn schedule(
        &self,
        principal: Money,
        annual_rate: Rate,
        periods: u32,
    ) -> Result<AmortizationSchedule> {
        let payment = self.payment(principal, annual_rate, periods)?;
        let r = self.periodic_rate(annual_rate, periods)?;

        let mut payments = Vec::with_capacity(periods as usize);
        let mut balance = principal;

        for i in 1..=periods {
            let interest_portion = Money::from_decimal(balance.as_decimal() * r);
            let is_last = i == periods;

            let (principal_portion, interest_portion) = if is_last {
                (balance, payment - balance)
            } else {
                (payment - interest_portion, interest_portion)
            };

            let ending_balance = (balance - principal_portion).max(Money::ZERO);

            payments.push(ScheduledPayment {
                payment_number: i,
                beginning_balance: balance,
                payment_amount: payment,
                principal_portion,
                interest_portion,
                ending_balance,
            });

            balance = ending_balance;
        }

        let total_interest = payments
            .iter()
            .map(|p| p.interest_portion)
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_payment = payments
            .iter()
            .map(|p| p.payment_amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        Ok(AmortizationSchedule {
            principal,
            annual_rate,
            periods,
            payments,
            total_interest,
            total_payment,
        })
    }

    fn periodic_rate(&self, annual_rate: Rate, periods: u32) -> Result<Decimal> {
        if periods == 0 || periods > MAX_PERIODS {
            return Err(LoanError::InvalidTerm { periods });
        }
        if annual_rate.is_negative() {
            return Err(LoanError::InvalidRate { rate: annual_rate });
        }
        Ok(annual_rate.periodic_rate(self.periods_per_year).as_decimal())
    }
}

/// (1 + r)^n by repeated multiplication
fn compound_factor(r: Decimal, periods: u32) -> Result<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        compound = compound
            .checked_mul(base)
            .ok_or_else(|| LoanError::CalculationError {
                message: format!("compound factor overflow after {} periods", periods),
            })?;
    }
    Ok(compound)
}

fn overflow(principal: Money, periods: u32) -> LoanError {
    LoanError::CalculationError {
        message: format!("payment overflow for principal {} over {} periods", principal, periods),
    }
}
