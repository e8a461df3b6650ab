use super::annuity::payment_for_term;
use super::types::{DebtParameters, DebtResult};

/// Smallest monthly payment the payoff planner accepts.
pub const MIN_DEBT_PAYMENT: f64 = 200.0;

/// Upper bound on the payoff loop. A schedule still open at the cap is
/// reported as infeasible, with the payment that would close it in time.
pub const MAX_PAYOFF_MONTHS: u64 = 2000;

const PAID_OFF_EPSILON: f64 = 1e-9;

/// Longest interest-free schedule whose month count is exact in an `f64`.
const MAX_EXACT_MONTHS: f64 = 9_007_199_254_740_992.0;

impl DebtResult {
    fn infeasible(required_minimum_payment: f64) -> Self {
        Self {
            months: None,
            years: None,
            total_interest: 0.0,
            last_payment: 0.0,
            feasible: false,
            required_minimum_payment,
        }
    }

    fn paid_off(months: u64, total_interest: f64, last_payment: f64) -> Self {
        Self {
            months: Some(months),
            years: Some(months as f64 / 12.0),
            total_interest,
            last_payment,
            feasible: true,
            required_minimum_payment: 0.0,
        }
    }
}

/// Smallest payment that both meets the policy floor and covers the first
/// month's interest with one unit left over for principal.
pub fn required_minimum_payment(principal: f64, annual_rate_pct: f64) -> f64 {
    let monthly_rate = (annual_rate_pct / 1200.0).max(0.0);
    let balance = principal.max(0.0);
    if monthly_rate == 0.0 || balance == 0.0 {
        return MIN_DEBT_PAYMENT;
    }
    let required_for_interest = (balance * monthly_rate + 1.0).ceil();
    MIN_DEBT_PAYMENT.max(required_for_interest)
}

/// Runs a fixed-payment amortization schedule against `principal`.
pub fn simulate_debt_payoff(params: &DebtParameters) -> DebtResult {
    let payment = params.monthly_payment;
    let monthly_rate = (params.annual_rate_pct / 1200.0).max(0.0);
    let mut balance = params.principal.max(0.0);

    // Also catches NaN payments.
    if !(payment >= MIN_DEBT_PAYMENT) {
        return DebtResult::infeasible(MIN_DEBT_PAYMENT);
    }

    if balance == 0.0 {
        return DebtResult::paid_off(0, 0.0, 0.0);
    }

    if monthly_rate == 0.0 {
        let months = (balance / payment).ceil();
        if !(months <= MAX_EXACT_MONTHS) {
            let required = MIN_DEBT_PAYMENT.max((balance / MAX_EXACT_MONTHS).ceil());
            return DebtResult::infeasible(required);
        }
        let last_payment = (balance - payment * (months - 1.0)).max(0.0);
        return DebtResult::paid_off(months as u64, 0.0, last_payment);
    }

    let required = required_minimum_payment(balance, params.annual_rate_pct);
    if payment < required {
        return DebtResult::infeasible(required);
    }

    let mut months = 0u64;
    let mut total_interest = 0.0;
    let mut last_payment = 0.0;
    while months < MAX_PAYOFF_MONTHS && balance > PAID_OFF_EPSILON {
        let interest = balance * monthly_rate;
        let pay_this_month = payment.min(balance + interest);
        let interest_paid = interest.min(pay_this_month);
        let principal_paid = pay_this_month - interest_paid;

        total_interest += interest_paid;
        balance -= principal_paid;
        months += 1;
        last_payment = pay_this_month;
    }

    if balance > PAID_OFF_EPSILON {
        let within_cap = payment_for_term(params.principal, monthly_rate, MAX_PAYOFF_MONTHS as f64).ceil();
        tracing::warn!(
            principal = params.principal,
            annual_rate_pct = params.annual_rate_pct,
            payment,
            remaining = balance,
            within_cap,
            "debt payoff did not converge within {MAX_PAYOFF_MONTHS} months"
        );
        return DebtResult::infeasible(required.max(within_cap));
    }

    DebtResult::paid_off(months, total_interest, last_payment)
}
