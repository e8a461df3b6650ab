use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeMode {
    /// Fee reduces the monthly growth rate.
    #[default]
    Net,
    /// Fee is charged once a year on accumulated gains.
    Gains,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionTiming {
    #[default]
    Begin,
    End,
}

#[derive(Debug, Clone)]
pub struct SimulationParameters {
    pub start: f64,
    pub monthly: f64,
    pub years: f64,
    pub annual_return_pct: f64,
    pub annual_fee_pct: f64,
    pub inflation_pct: f64,
    pub tax_pct: f64,
    pub fee_mode: FeeMode,
    pub timing: ContributionTiming,
}

/// Year-indexed series for charting. All five vectors have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySeries {
    pub nominal: Vec<f64>,
    pub inflation_adjusted: Vec<f64>,
    pub contributions: Vec<f64>,
    pub after_tax: Vec<f64>,
    pub after_tax_inflation_adjusted: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentResult {
    pub before_tax: f64,
    pub gains: f64,
    pub est_tax: f64,
    pub after_tax: f64,
    pub after_inflation: f64,
    pub after_tax_inflation: f64,
    pub total_contrib: f64,
    pub effective_monthly_rate: f64,
    pub yearly: YearlySeries,
}

#[derive(Debug, Clone)]
pub struct DebtParameters {
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub monthly_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtResult {
    /// `None` when the schedule never pays off.
    pub months: Option<u64>,
    pub years: Option<f64>,
    pub total_interest: f64,
    pub last_payment: f64,
    pub feasible: bool,
    pub required_minimum_payment: f64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    #[default]
    #[serde(alias = "yearRound", alias = "year_round", alias = "helaar")]
    YearRound,
    #[serde(alias = "fritid")]
    Holiday,
    #[serde(alias = "andel")]
    Cooperative,
}

impl PropertyType {
    /// Share of the property price the primary facility may lend against.
    pub fn ltv_cap(self) -> f64 {
        match self {
            PropertyType::YearRound => 0.80,
            PropertyType::Holiday => 0.75,
            PropertyType::Cooperative => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PrimaryFacilityTerms {
    pub years: f64,
    pub interest_only_years: f64,
    pub rate_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SecondaryFacilityTerms {
    pub years: f64,
    pub rate_pct: f64,
}

#[derive(Debug, Clone)]
pub struct MortgageStructure {
    pub property_type: PropertyType,
    pub price: f64,
    pub down_payment: f64,
    pub primary: PrimaryFacilityTerms,
    pub secondary: SecondaryFacilityTerms,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageStructureResult {
    pub down_payment: f64,
    pub need: f64,
    pub max_primary_loan: f64,
    pub primary_loan: f64,
    pub secondary_loan: f64,
    pub primary_payment_interest_only: f64,
    pub primary_payment_after_interest_only: f64,
    pub secondary_payment: f64,
    pub total_initial_payment: f64,
    pub total_after_interest_only_payment: f64,
    pub ltv: f64,
    pub low_down_payment: bool,
}

#[derive(Debug, Clone)]
pub struct MortgageCapacity {
    pub income1: f64,
    pub income2: f64,
    pub tax_pct: f64,
    pub housing_share_pct: f64,
    pub obligations: f64,
    pub stress_rate_pct: f64,
    pub years: f64,
    pub interest_only_years: f64,
    pub down_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageCapacityResult {
    pub net_monthly: f64,
    pub budget: f64,
    pub loan_capacity: f64,
    pub max_price: f64,
}

/// How a budget bucket is sized. A fixed amount of zero is a real choice,
/// distinct from "use the percentage".
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "kebab-case")]
pub enum AllocationMode {
    Percentage(f64),
    FixedAmount(f64),
}

impl Default for AllocationMode {
    fn default() -> Self {
        AllocationMode::Percentage(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct SalaryParameters {
    pub salary_pre_tax: f64,
    pub labour_market_pct: f64,
    pub pension_pct: f64,
    pub atp_fixed: f64,
    pub deduction: f64,
    pub tax_rate_pct: f64,
    pub essentials: AllocationMode,
    pub fun: AllocationMode,
    pub future: AllocationMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResult {
    pub salary_pre_tax: f64,
    pub labour_market_contribution: f64,
    pub pension: f64,
    pub atp: f64,
    pub amount_before_deduction: f64,
    pub deduction: f64,
    pub amount_after_deduction: f64,
    pub taxed_amount: f64,
    pub salary_after_tax: f64,
    pub essentials: f64,
    pub fun: f64,
    pub future: f64,
    pub allocated: f64,
    pub leftover: f64,
    pub pct_used: f64,
    pub pct_sum: f64,
    pub over_allocated: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            start: 0.0,
            monthly: 6_000.0,
            years: 30.0,
            annual_return_pct: 8.0,
            annual_fee_pct: 1.0,
            inflation_pct: 2.0,
            tax_pct: 27.0,
            fee_mode: FeeMode::Net,
            timing: ContributionTiming::Begin,
        }
    }
}

impl Default for DebtParameters {
    fn default() -> Self {
        Self {
            principal: 480_000.0,
            annual_rate_pct: 3.0,
            monthly_payment: 4_084.0,
        }
    }
}

impl Default for MortgageStructure {
    fn default() -> Self {
        Self {
            property_type: PropertyType::YearRound,
            price: 2_500_000.0,
            down_payment: 300_000.0,
            primary: PrimaryFacilityTerms {
                years: 30.0,
                interest_only_years: 0.0,
                rate_pct: 4.0,
            },
            secondary: SecondaryFacilityTerms {
                years: 30.0,
                rate_pct: 7.0,
            },
        }
    }
}

impl Default for MortgageCapacity {
    fn default() -> Self {
        Self {
            income1: 450_000.0,
            income2: 0.0,
            tax_pct: 38.0,
            housing_share_pct: 30.0,
            obligations: 0.0,
            stress_rate_pct: 6.0,
            years: 30.0,
            interest_only_years: 0.0,
            down_payment: 300_000.0,
        }
    }
}

impl Default for SalaryParameters {
    fn default() -> Self {
        Self {
            salary_pre_tax: 40_000.0,
            labour_market_pct: 8.0,
            pension_pct: 3.0,
            atp_fixed: 99.0,
            deduction: 9_868.0,
            tax_rate_pct: 36.0,
            essentials: AllocationMode::default(),
            fun: AllocationMode::default(),
            future: AllocationMode::default(),
        }
    }
}
