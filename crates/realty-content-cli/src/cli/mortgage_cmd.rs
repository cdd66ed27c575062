//! `realty-content mortgage`: monthly payment and amortization.

use anyhow::{bail, Result};
use realty_content::mortgage::{amortization_schedule, loan_amount, summarize, AmortizationRow};

use super::output::{is_json, print_json};

/// Loan inputs as given on the command line.
#[derive(Debug, Clone)]
pub struct MortgageArgs {
    pub principal: Option<f64>,
    pub price: Option<f64>,
    pub down_percent: f64,
    pub rate: f64,
    pub years: u32,
    pub schedule: bool,
}

impl MortgageArgs {
    /// Loan amount: explicit principal, else price less the down payment.
    pub fn principal(&self) -> Result<f64> {
        match (self.principal, self.price) {
            (Some(p), _) => Ok(p),
            (None, Some(price)) => Ok(loan_amount(price, self.down_percent)?),
            (None, None) => bail!("either --principal or --price is required"),
        }
    }
}

/// Run the mortgage command.
pub fn run(args: &MortgageArgs) -> Result<()> {
    let principal = args.principal()?;
    let summary = summarize(principal, args.rate, args.years)?;
    let schedule = if args.schedule {
        amortization_schedule(principal, args.rate, args.years)?
    } else {
        Vec::new()
    };

    if is_json() {
        print_json(&serde_json::json!({
            "principal": principal,
            "summary": summary,
            "schedule": schedule,
        }));
        return Ok(());
    }

    println!("Loan amount:     {}", money(principal));
    println!("Monthly payment: {}", money(summary.monthly_payment));
    println!("Total paid:      {}", money(summary.total_paid));
    println!("Total interest:  {}", money(summary.total_interest));
    if !schedule.is_empty() {
        println!();
        print!("{}", render_schedule(&schedule));
    }
    Ok(())
}

/// `$1,234.56`.
pub fn money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (sign, cents) = if cents < 0 { ("-", -cents) } else { ("", cents) };
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Yearly rows (every twelfth month) of a schedule.
pub fn render_schedule(rows: &[AmortizationRow]) -> String {
    let mut out = String::from("  Year   Principal     Interest      Balance\n");
    let mut principal = 0.0;
    let mut interest = 0.0;
    for row in rows {
        principal += row.principal;
        interest += row.interest;
        if row.month % 12 == 0 || row.month as usize == rows.len() {
            out.push_str(&format!(
                "  {:>4}  {:>12}  {:>11}  {:>12}\n",
                row.month.div_ceil(12),
                money(principal),
                money(interest),
                money(row.balance)
            ));
            principal = 0.0;
            interest = 0.0;
        }
    }
    out
}
