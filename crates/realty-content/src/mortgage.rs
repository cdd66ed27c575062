//! Fixed-rate mortgage arithmetic.

use serde::Serialize;

use crate::error::{ContentError, ContentResult};

/// Payment for `principal` over `payments` months at `monthly_rate`.
///
/// Standard amortization `P·r(1+r)^n / ((1+r)^n − 1)`. A zero rate, or
/// one too small for `(1+r)^n` to leave 1.0, divides the principal evenly.
pub fn payment_for(principal: f64, monthly_rate: f64, payments: u32) -> f64 {
    let n = payments as f64;
    let even = principal / n;
    if monthly_rate == 0.0 {
        return even;
    }
    let growth = (1.0 + monthly_rate).powf(n);
    if growth - 1.0 == 0.0 {
        return even;
    }
    let payment = principal * monthly_rate * growth / (growth - 1.0);
    if payment.is_finite() {
        payment
    } else {
        even
    }
}

/// Longest term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 100;

fn payment_count(years: u32) -> u32 {
    years * 12
}

fn validate(principal: f64, annual_rate_percent: f64, years: u32) -> ContentResult<()> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(ContentError::InvalidInput(format!(
            "principal must be positive, got {principal}"
        )));
    }
    if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
        return Err(ContentError::InvalidInput(format!(
            "interest rate must be non-negative, got {annual_rate_percent}"
        )));
    }
    if years == 0 {
        return Err(ContentError::InvalidInput(
            "term must be at least one year".to_string(),
        ));
    }
    if years > MAX_TERM_YEARS {
        return Err(ContentError::InvalidInput(format!(
            "term must be at most {MAX_TERM_YEARS} years, got {years}"
        )));
    }
    Ok(())
}

/// Monthly payment for a loan quoted as an annual percentage over `years`.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, years: u32) -> ContentResult<f64> {
    validate(principal, annual_rate_percent, years)?;
    Ok(payment_for(
        principal,
        annual_rate_percent / 100.0 / 12.0,
        payment_count(years),
    ))
}

/// Loan amount after a down payment given as a percentage of the price.
pub fn loan_amount(price: f64, down_payment_percent: f64) -> ContentResult<f64> {
    if !(0.0..100.0).contains(&down_payment_percent) {
        return Err(ContentError::InvalidInput(format!(
            "down payment must be between 0 and 100 percent, got {down_payment_percent}"
        )));
    }
    Ok(price * (1.0 - down_payment_percent / 100.0))
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    /// Balance remaining after this payment.
    pub balance: f64,
}

/// Totals over the life of the loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MortgageSummary {
    pub monthly_payment: f64,
    pub payments: u32,
    pub total_paid: f64,
    pub total_interest: f64,
}

/// Month-by-month schedule. The final row absorbs rounding so the
/// balance lands on exactly zero.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_percent: f64,
    years: u32,
) -> ContentResult<Vec<AmortizationRow>> {
    let payment = monthly_payment(principal, annual_rate_percent, years)?;
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let payments = payment_count(years);

    let mut balance = principal;
    let mut rows = Vec::with_capacity(payments as usize);
    for month in 1..=payments {
        let interest = balance * monthly_rate;
        let mut toward_principal = payment - interest;
        let mut this_payment = payment;
        if month == payments {
            toward_principal = balance;
            this_payment = balance + interest;
        }
        balance -= toward_principal;
        rows.push(AmortizationRow {
            month,
            payment: this_payment,
            principal: toward_principal,
            interest,
            balance: if month == payments { 0.0 } else { balance },
        });
    }
    Ok(rows)
}

/// Payment and lifetime totals.
pub fn summarize(principal: f64, annual_rate_percent: f64, years: u32) -> ContentResult<MortgageSummary> {
    let monthly_payment = monthly_payment(principal, annual_rate_percent, years)?;
    let payments = payment_count(years);
    let total_paid = monthly_payment * payments as f64;
    Ok(MortgageSummary {
        monthly_payment,
        payments,
        total_paid,
        total_interest: total_paid - principal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_payment_matches_formula() {
        let p: f64 = 300_000.0;
        let r: f64 = 0.065 / 12.0;
        let n = 360u32;
        let expected = p * r * (1.0 + r).powi(360) / ((1.0 + r).powi(360) - 1.0);
        assert!(close(payment_for(p, r, n), expected, 1e-9));
        assert!(close(monthly_payment(p, 6.5, 30).unwrap(), 1896.20, 0.01));
    }

    #[test]
    fn test_zero_rate_is_exact_division() {
        assert_eq!(payment_for(120_000.0, 0.0, 120), 1000.0);
        assert_eq!(monthly_payment(120_000.0, 0.0, 10).unwrap(), 1000.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(monthly_payment(0.0, 5.0, 30).is_err());
        assert!(monthly_payment(100_000.0, -1.0, 30).is_err());
        assert!(monthly_payment(100_000.0, 5.0, 0).is_err());
        assert!(monthly_payment(f64::NAN, 5.0, 30).is_err());
        assert!(loan_amount(500_000.0, 100.0).is_err());
    }

    #[test]
    fn test_tiny_rate_falls_back_to_even_split() {
        let payment = monthly_payment(120_000.0, 1e-15, 10).unwrap();
        assert!(payment.is_finite());
        assert!(close(payment, 1000.0, 1e-6));
        assert!(payment_for(120_000.0, 1e-300, 120).is_finite());
    }

    #[test]
    fn test_term_is_bounded() {
        assert!(monthly_payment(100_000.0, 5.0, MAX_TERM_YEARS).is_ok());
        for years in [MAX_TERM_YEARS + 1, 400_000_000, u32::MAX] {
            let err = monthly_payment(100_000.0, 5.0, years).unwrap_err();
            assert!(matches!(err, ContentError::InvalidInput(_)));
            assert!(amortization_schedule(100_000.0, 5.0, years).is_err());
            assert!(summarize(100_000.0, 5.0, years).is_err());
        }
    }

    #[test]
    fn test_loan_amount() {
        assert_eq!(loan_amount(500_000.0, 20.0).unwrap(), 400_000.0);
        assert_eq!(loan_amount(500_000.0, 0.0).unwrap(), 500_000.0);
    }

    #[test]
    fn test_schedule_pays_off_loan() {
        let rows = amortization_schedule(250_000.0, 7.0, 15).unwrap();
        assert_eq!(rows.len(), 180);
        assert_eq!(rows.last().unwrap().balance, 0.0);
        let principal_paid: f64 = rows.iter().map(|r| r.principal).sum();
        assert!(close(principal_paid, 250_000.0, 1e-6));
        assert!(rows[0].interest > rows[179].interest);
    }

    #[test]
    fn test_summary_totals() {
        let s = summarize(120_000.0, 0.0, 10).unwrap();
        assert_eq!(s.payments, 120);
        assert_eq!(s.total_paid, 120_000.0);
        assert_eq!(s.total_interest, 0.0);
    }
}
