/// interactive - console prompts with defaults and a text summary after each step
use std::io::{self, BufRead, Write};

use p2p_loan_rs::{
    Account, AccountId, Decimal, FundingOutcome, FundingRequest, Loan, LoanConfig, LoanDefaults,
    LoanError, LoanId, LoanInput, LoanStatus, LoanTerms, LoanView, Money, PaymentOutcome, Rate,
    Result, SafeTimeProvider, TimeSource,
};
use tracing_subscriber::EnvFilter;

/// reads answers from stdin, falling back to defaults on an empty line
struct ConsoleInput {
    defaults: LoanDefaults,
}

impl ConsoleInput {
    fn prompt(&self, message: &str) -> Result<String> {
        print!("{}: ", message);
        io::stdout().flush().map_err(input_error)?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map_err(input_error)?;
        Ok(line.trim().to_string())
    }

    /// keep asking until the answer is a whole non-negative number
    fn prompt_number(&self, message: &str, default: &str, unit: &str) -> Result<u64> {
        loop {
            let answer = self.prompt(message)?;
            let answer = if answer.is_empty() { default.to_string() } else { answer };
            match answer.parse::<u64>() {
                Ok(value) => return Ok(value),
                Err(_) => println!("Please enter a number in {}", unit),
            }
        }
    }
}

impl LoanInput for ConsoleInput {
    fn request_loan_terms(&mut self) -> Result<LoanTerms> {
        let principal = self.prompt_number(
            &format!(
                "BORROWER: amount to borrow in dollars (ENTER for ${})",
                self.defaults.principal
            ),
            &self.defaults.principal.round_dp(0).to_string(),
            "dollars",
        )?;
        let months = self.prompt_number(
            &format!(
                "BORROWER: payback period in months (ENTER for {})",
                self.defaults.period_months
            ),
            &self.defaults.period_months.to_string(),
            "months",
        )?;

        let period_months = u32::try_from(months).map_err(input_error)?;
        let principal = i64::try_from(principal).map_err(input_error)?;
        Ok(LoanTerms::new(Money::from_major(principal), period_months))
    }

    fn request_offer(&mut self, _terms: &LoanTerms) -> Result<Rate> {
        let default = self.defaults.annual_rate.as_percentage().normalize().to_string();
        let percent = self.prompt_number(
            &format!("INVESTOR: annual interest rate offer in % (ENTER for {}%)", default),
            &default,
            "interest rate percentage",
        )?;
        Ok(Rate::from_percentage_decimal(Decimal::from(percent)))
    }

    fn request_acceptance(&mut self, _terms: &LoanTerms, annual_rate: Rate) -> Result<bool> {
        let default = if self.defaults.accept_offer { "YES" } else { "NO" };
        let answer = self.prompt(&format!(
            "BORROWER: enter YES to accept {} or NO to decline (ENTER for {})",
            annual_rate, default
        ))?;
        let answer = if answer.is_empty() { default.to_string() } else { answer };
        Ok(answer.eq_ignore_ascii_case("yes"))
    }
}

fn input_error(e: impl std::fmt::Display) -> LoanError {
    LoanError::Input {
        message: e.to_string(),
    }
}

fn render(view: &LoanView) {
    let na = || "N/A".to_string();
    println!("___________________________");
    println!("####### P2P LOAN #######");
    println!(" Loan ID: {}", view.loan_id);
    println!(" Loan Status: {}", view.status);
    println!("___________________________");
    println!(" *BORROWER*");
    println!(" User ID: {}", view.borrower.id);
    println!(" Name: {}", view.borrower.name);
    println!(" Balance (Private): ${:>10.2}", view.borrower.balance.as_decimal());
    println!("___________________________");
    println!(" *INVESTOR*");
    println!(" User ID: {}", view.investor.id);
    println!(" Name: {}", view.investor.name);
    println!(" Balance (Private): ${:>10.2}", view.investor.balance.as_decimal());
    println!("___________________________");
    println!(" *LOAN INFORMATION*");
    println!(" Loan Amount: ${:>10.2}", view.principal.as_decimal());
    println!(
        " Loan Period: {} Months",
        view.period_months.map(|p| p.to_string()).unwrap_or_else(na)
    );
    println!(
        " Interest Rate Offer: {}",
        view.annual_rate.map(|r| r.to_string()).unwrap_or_else(na)
    );
    println!("___________________________");
    println!(" *PAYMENT*");
    println!(
        " Payment: {}",
        view.scheduled_payment
            .map(|p| format!("${:>10.2}", p.as_decimal()))
            .unwrap_or_else(na)
    );
    println!();
}

fn wait(message: &str) -> Result<()> {
    print!("{}", message);
    io::stdout().flush().map_err(input_error)?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(input_error)?;
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls verbosity
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = LoanConfig::monthly();
    let time = SafeTimeProvider::new(TimeSource::System);

    let mut loan = Loan::new(
        LoanId::new("L48583"),
        Account::new(AccountId::new("A652DE4K"), "Kenny", 26, Money::from_major(2_000)),
        Account::new(AccountId::new("ASFKWI12"), "John", 35, Money::from_major(10_000)),
        config.clone(),
        &time,
    )?;
    let mut input = ConsoleInput {
        defaults: config.defaults.clone(),
    };

    render(&loan.snapshot());
    let terms = input.request_loan_terms()?;
    loan.note_request(terms, &time)?;
    render(&loan.snapshot());

    let rate = input.request_offer(&terms)?;
    loan.note_offer(rate, &time)?;
    render(&loan.snapshot());

    let accepts = input.request_acceptance(&terms, rate)?;
    let outcome = loan.request_funding(FundingRequest::new(terms, rate, accepts), &time)?;
    render(&loan.snapshot());

    match outcome {
        FundingOutcome::DeclinedByBorrower => {
            println!("Borrower has declined investor's offer");
            return Ok(());
        }
        FundingOutcome::InsufficientInvestorFunds { .. } => {
            println!("Investor has insufficient balance");
            return Ok(());
        }
        FundingOutcome::Funded { .. } => {}
    }

    wait("Loan initialized, press ENTER to start payback")?;

    let mut month = 0;
    while loan.status() == LoanStatus::Funded {
        month += 1;
        let outcome = loan.advance_period(&time)?;
        render(&loan.snapshot());
        if let PaymentOutcome::InsufficientBorrowerFunds { .. } = outcome {
            println!("Borrower has insufficient funds to pay back loan payment for the month");
        }
        println!("End of Month {}", month);

        if loan.status() == LoanStatus::Completed {
            println!("Loan with interest has been paid back in full");
        } else {
            wait("Press ENTER for next month")?;
        }
    }

    Ok(())
}
