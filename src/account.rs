use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::AccountId;

/// a participant's account; borrower and investor use the same type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub age: u32,
    balance: Money,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, age: u32, balance: Money) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            balance,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn can_cover(&self, amount: Money) -> bool {
        self.balance >= amount
    }

    /// money arriving from outside any loan
    pub fn deposit(&mut self, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(LoanError::InvalidAmount { amount });
        }
        self.balance += amount;
        debug!(account = %self.id, amount = %amount, "deposit");
        Ok(())
    }
}

/// two-legged movement of money between accounts.
/// `debit` leaves the payer, `credit` reaches the payee; any difference is a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub debit: Money,
    pub credit: Money,
}

impl Transfer {
    /// payer and payee see the same amount
    pub fn exact(amount: Money) -> Self {
        Self {
            debit: amount,
            credit: amount,
        }
    }

    /// payer also covers a fee the payee never receives
    pub fn with_fee(amount: Money, fee: Money) -> Self {
        Self {
            debit: amount + fee,
            credit: amount,
        }
    }

    pub fn fee(&self) -> Money {
        self.debit - self.credit
    }
}

/// apply a transfer; both balances are computed before either is written
pub fn transfer(from: &mut Account, to: &mut Account, transfer: Transfer) {
    let from_balance = from.balance - transfer.debit;
    let to_balance = to.balance + transfer.credit;

    from.balance = from_balance;
    to.balance = to_balance;

    debug!(
        from = %from.id,
        to = %to.id,
        debit = %transfer.debit,
        credit = %transfer.credit,
        "transfer applied"
    );
}
