/// lifecycle - scripted origination and monthly repayment on controlled time
use chrono::{Duration, TimeZone, Utc};
use p2p_loan_rs::{
    Account, AccountId, Loan, LoanConfig, LoanId, LoanSession, LoanTerms, Money, PaymentOutcome,
    Rate, SafeTimeProvider, ScriptedInput, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let loan = Loan::new(
        LoanId::new("L48583"),
        Account::new(AccountId::new("A652DE4K"), "Kenny", 26, Money::from_major(2_000)),
        Account::new(AccountId::new("ASFKWI12"), "John", 35, Money::from_major(10_000)),
        LoanConfig::monthly(),
        &time,
    )?;

    let input = ScriptedInput::new(
        LoanTerms::new(Money::from_major(5_000), 6),
        Rate::from_percentage(15),
        true,
    );
    let mut session = LoanSession::new(loan, input);

    // 1. origination
    println!("1. origination");
    let outcome = session.originate(&time)?;
    println!("  outcome: {:?}", outcome);
    if !outcome.is_funded() {
        return Ok(());
    }

    let schedule = session.loan().schedule()?;
    println!("\n  schedule:");
    for row in &schedule.payments {
        println!(
            "    #{:<2} payment {:>8.2}  interest {:>7.2}  principal {:>8.2}  balance {:>8.2}",
            row.payment_number,
            row.payment_amount.as_decimal(),
            row.interest_portion.as_decimal(),
            row.principal_portion.as_decimal(),
            row.ending_balance.as_decimal(),
        );
    }
    println!("    total interest: {:.2}", schedule.total_interest.as_decimal());

    // 2. repayment, one period per month
    println!("\n2. repayment");
    let mut month = 0;
    loop {
        controller.advance(Duration::days(30));
        month += 1;

        match session.advance_period(&time)? {
            PaymentOutcome::PaymentApplied { amount, remaining_periods } => {
                println!(
                    "  {} month {}: paid {:.2}, {} left",
                    time.now().format("%Y-%m-%d"),
                    month,
                    amount.as_decimal(),
                    remaining_periods
                );
            }
            PaymentOutcome::Completed { final_payment } => {
                println!(
                    "  {} month {}: final payment {:.2}",
                    time.now().format("%Y-%m-%d"),
                    month,
                    final_payment.as_decimal()
                );
                break;
            }
            PaymentOutcome::InsufficientBorrowerFunds { available, required } => {
                println!(
                    "  month {}: borrower short ({:.2} of {:.2})",
                    month,
                    available.as_decimal(),
                    required.as_decimal()
                );
                break;
            }
        }
    }

    // 3. audit trail
    println!("\n3. snapshots");
    for snapshot in session.loan().snapshots() {
        println!(
            "  {} {:<28} {}",
            snapshot.timestamp.format("%Y-%m-%d"),
            snapshot.trigger,
            snapshot.view.status
        );
    }

    println!("\nfinal state:\n{}", session.loan().to_json_pretty());

    Ok(())
}
