use super::annuity::{annuity_payment, principal_from_payment};
use super::types::{
    MortgageCapacity, MortgageCapacityResult, MortgageStructure, MortgageStructureResult,
};

pub const MAX_INTEREST_ONLY_YEARS: f64 = 10.0;

/// Down payments below this share of the price get flagged.
pub const RECOMMENDED_DOWN_PAYMENT_SHARE: f64 = 0.05;

const TAX_PCT_RANGE: (f64, f64) = (0.0, 60.0);
const HOUSING_SHARE_PCT_RANGE: (f64, f64) = (5.0, 60.0);

/// Splits the loan need between the LTV-capped primary facility and a
/// secondary facility that covers the rest.
pub fn compute_mortgage_structure(params: &MortgageStructure) -> MortgageStructureResult {
    let price = params.price.max(0.0);
    let down_payment = params.down_payment.max(0.0).min(price);
    let need = (price - down_payment).max(0.0);

    let max_primary_loan = params.property_type.ltv_cap() * price;
    let primary_loan = need.min(max_primary_loan);
    let secondary_loan = (need - primary_loan).max(0.0);

    let primary_years = params.primary.years.max(0.0);
    let interest_only_years = params
        .primary
        .interest_only_years
        .clamp(0.0, MAX_INTEREST_ONLY_YEARS);
    let primary_rate_pct = params.primary.rate_pct.max(0.0);
    let secondary_years = params.secondary.years.max(1.0);
    let secondary_rate_pct = params.secondary.rate_pct.max(0.0);

    let (primary_payment_interest_only, primary_payment_after_interest_only) =
        if primary_loan > 0.0 {
            let amortizing_years = primary_years - interest_only_years;
            let amortizing_years = if amortizing_years > 0.0 {
                amortizing_years
            } else {
                primary_years
            };
            (
                primary_loan * (primary_rate_pct / 100.0 / 12.0),
                annuity_payment(primary_loan, primary_rate_pct, amortizing_years),
            )
        } else {
            (0.0, 0.0)
        };

    let secondary_payment = if secondary_loan > 0.0 {
        annuity_payment(secondary_loan, secondary_rate_pct, secondary_years)
    } else {
        0.0
    };

    MortgageStructureResult {
        down_payment,
        need,
        max_primary_loan,
        primary_loan,
        secondary_loan,
        primary_payment_interest_only,
        primary_payment_after_interest_only,
        secondary_payment,
        total_initial_payment: primary_payment_interest_only + secondary_payment,
        total_after_interest_only_payment: primary_payment_after_interest_only
            + secondary_payment,
        ltv: if price > 0.0 { need / price } else { 0.0 },
        low_down_payment: down_payment < price * RECOMMENDED_DOWN_PAYMENT_SHARE,
    }
}

/// Largest loan a household can service at the stress-test rate, and the
/// property price that loan plus the down payment reaches.
pub fn compute_mortgage_capacity(params: &MortgageCapacity) -> MortgageCapacityResult {
    let income = params.income1.max(0.0) + params.income2.max(0.0);
    let tax_pct = params.tax_pct.clamp(TAX_PCT_RANGE.0, TAX_PCT_RANGE.1);
    let housing_share_pct = params
        .housing_share_pct
        .clamp(HOUSING_SHARE_PCT_RANGE.0, HOUSING_SHARE_PCT_RANGE.1);
    let obligations = params.obligations.max(0.0);
    let years = params.years.max(1.0);
    let interest_only_years = params
        .interest_only_years
        .clamp(0.0, MAX_INTEREST_ONLY_YEARS);

    let net_monthly = income * (1.0 - tax_pct / 100.0) / 12.0;
    let budget = (net_monthly * housing_share_pct / 100.0 - obligations).max(0.0);
    let loan_capacity = principal_from_payment(
        budget,
        params.stress_rate_pct,
        (years - interest_only_years).max(1.0),
    );

    MortgageCapacityResult {
        net_monthly,
        budget,
        loan_capacity,
        max_price: loan_capacity + params.down_payment.max(0.0),
    }
}
