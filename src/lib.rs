pub mod account;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod input;
pub mod loan;
pub mod payments;
pub mod serialization;
pub mod session;
pub mod state;
pub mod types;

// re-export key types
pub use account::{Account, Transfer};
pub use config::{LoanConfig, LoanDefaults};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use input::{LoanInput, LoanTerms, ScriptedInput};
pub use loan::{FundingRequest, Loan};
pub use payments::{AmortizationCalculator, AmortizationSchedule, ScheduledPayment};
pub use serialization::{LoanView, PartyView};
pub use session::LoanSession;
pub use state::{LoanState, StateSnapshot};
pub use types::{AccountId, FundingOutcome, LoanId, LoanStatus, PaymentOutcome};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
