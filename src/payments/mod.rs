pub mod amortization;

pub use amortization::{AmortizationCalculator, AmortizationSchedule, ScheduledPayment};
