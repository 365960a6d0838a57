use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// loan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfig {
    /// flat fee charged to the investor on top of principal at funding
    pub origination_fee: Money,
    /// installments per year; the periodic rate is annual / this
    pub periods_per_year: u32,
    /// exclusive upper bound for the annual rate
    pub max_annual_rate: Rate,
    /// values input adapters fall back to when the user supplies nothing
    #[serde(default)]
    pub defaults: LoanDefaults,
}

/// prompt defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDefaults {
    pub principal: Money,
    pub period_months: u32,
    pub annual_rate: Rate,
    pub accept_offer: bool,
}

impl Default for LoanDefaults {
    fn default() -> Self {
        Self {
            principal: Money::from_major(5000),
            period_months: 6,
            annual_rate: Rate::from_percentage(15),
            accept_offer: true,
        }
    }
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self::monthly()
    }
}

impl LoanConfig {
    /// monthly installments with a flat $3 origination fee
    pub fn monthly() -> Self {
        Self {
            origination_fee: Money::from_major(3),
            periods_per_year: 12,
            max_annual_rate: Rate::ONE,
            defaults: LoanDefaults::default(),
        }
    }

    /// same schedule without an origination fee
    pub fn fee_free() -> Self {
        Self {
            origination_fee: Money::ZERO,
            ..Self::monthly()
        }
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoanConfig =
            serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.origination_fee.is_negative() {
            return Err(LoanError::InvalidConfiguration {
                message: format!("origination fee cannot be negative: {}", self.origination_fee),
            });
        }

        if self.periods_per_year == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "periods_per_year must be at least 1".to_string(),
            });
        }

        if self.max_annual_rate.as_decimal() <= dec!(0) {
            return Err(LoanError::InvalidConfiguration {
                message: format!("max_annual_rate must be positive: {}", self.max_annual_rate),
            });
        }

        if self.defaults.period_months == 0 || !self.defaults.principal.is_positive() {
            return Err(LoanError::InvalidConfiguration {
                message: "defaults must describe a positive principal and term".to_string(),
            });
        }

        Ok(())
    }
}
