//! Level-payment annuity math shared by the mortgage and debt calculators.

/// Number of monthly periods in `years`, rounded to the nearest month.
/// Kept as `f64` so arbitrarily long terms never wrap.
fn periods(years: f64) -> f64 {
    let months = (years * 12.0).round();
    if months.is_finite() && months > 0.0 {
        months
    } else {
        0.0
    }
}

fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct.max(0.0) / 100.0 / 12.0
}

/// Fixed monthly payment that amortizes `principal` over `years`.
pub fn annuity_payment(principal: f64, annual_rate_pct: f64, years: f64) -> f64 {
    payment_for_term(principal, monthly_rate(annual_rate_pct), periods(years))
}

/// Principal that a fixed monthly `payment` services over `years`.
pub fn principal_from_payment(payment: f64, annual_rate_pct: f64, years: f64) -> f64 {
    principal_for_term(payment, monthly_rate(annual_rate_pct), periods(years))
}

pub(crate) fn payment_for_term(principal: f64, monthly_rate: f64, months: f64) -> f64 {
    let principal = principal.max(0.0);
    if months <= 0.0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return principal / months;
    }
    principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-months))
}

pub(crate) fn principal_for_term(payment: f64, monthly_rate: f64, months: f64) -> f64 {
    let payment = payment.max(0.0);
    if months <= 0.0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return payment * months;
    }
    payment * (1.0 - (1.0 + monthly_rate).powf(-months)) / monthly_rate
}
