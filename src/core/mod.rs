mod annuity;
mod budget;
mod debt;
mod invest;
mod mortgage;
mod types;

pub use annuity::{annuity_payment, principal_from_payment};
pub use budget::compute_budget;
pub use debt::{
    MAX_PAYOFF_MONTHS, MIN_DEBT_PAYMENT, required_minimum_payment, simulate_debt_payoff,
};
pub use invest::{MAX_INVEST_YEARS, simulate_investment};
pub use mortgage::{
    MAX_INTEREST_ONLY_YEARS, RECOMMENDED_DOWN_PAYMENT_SHARE, compute_mortgage_capacity,
    compute_mortgage_structure,
};
pub use types::{
    AllocationMode, BudgetResult, ContributionTiming, DebtParameters, DebtResult, FeeMode,
    InvestmentResult, MortgageCapacity, MortgageCapacityResult, MortgageStructure,
    MortgageStructureResult, PrimaryFacilityTerms, PropertyType, SalaryParameters,
    SecondaryFacilityTerms, SimulationParameters, YearlySeries,
};

/// Percentage to fraction, floored at zero.
fn pct_to_rate(pct: f64) -> f64 {
    (pct / 100.0).max(0.0)
}
