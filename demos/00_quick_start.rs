/// quick start - minimal example to get started
use p2p_loan_rs::{Account, AccountId, FundingRequest, Loan, LoanConfig, LoanId, LoanStatus, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let borrower = Account::new(AccountId::new("A652DE4K"), "Kenny", 26, Money::from_major(2_000));
    let investor = Account::new(AccountId::new("ASFKWI12"), "John", 35, Money::from_major(10_000));

    let mut loan = Loan::new_now(LoanId::new("L48583"), borrower, investor, LoanConfig::monthly())?;

    // $5,000 over 6 months at 15%, accepted
    let outcome = loan.request_funding_now(FundingRequest {
        principal: Money::from_major(5_000),
        period_months: 6,
        annual_rate: Rate::from_percentage(15),
        borrower_accepts: true,
    })?;
    println!("funding: {:?}", outcome);

    while loan.status() == LoanStatus::Funded {
        println!("{:?}", loan.advance_period_now()?);
    }

    println!("{}", loan.to_json_pretty());

    Ok(())
}
