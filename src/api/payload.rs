use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::input::NumberInput;
use super::store::FieldStore;
use crate::core::{
    AllocationMode, ContributionTiming, DebtParameters, FeeMode, MortgageCapacity,
    MortgageStructure, PropertyType, SalaryParameters, SimulationParameters,
};

/// Fills parameters from a request, the stored fields and the built-in
/// defaults, in that order, and remembers which request values to persist.
pub struct Resolver<'a> {
    store: &'a FieldStore,
    prefix: &'static str,
    touched: Vec<(String, Value)>,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a FieldStore, prefix: &'static str) -> Self {
        Self {
            store,
            prefix,
            touched: Vec::new(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    pub fn number(&mut self, name: &str, input: Option<&NumberInput>, default: f64) -> f64 {
        let key = self.key(name);
        let stored = self.store.number(&key, default);
        match input {
            Some(input) => {
                let value = input.resolve(stored);
                self.touched.push((key, Value::from(value)));
                value
            }
            None => stored,
        }
    }

    pub fn choice<T>(&mut self, name: &str, input: Option<T>, default: T) -> T
    where
        T: DeserializeOwned + serde::Serialize + Copy,
    {
        let key = self.key(name);
        match input {
            Some(value) => {
                if let Ok(encoded) = serde_json::to_value(value) {
                    self.touched.push((key, encoded));
                }
                value
            }
            None => self.store.decode(&key, default),
        }
    }

    /// Request values that should be written back to the store.
    pub fn into_touched(self) -> Vec<(String, Value)> {
        self.touched
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestPayload {
    pub start: Option<NumberInput>,
    pub monthly: Option<NumberInput>,
    pub years: Option<NumberInput>,
    pub return_pct: Option<NumberInput>,
    pub fee_pct: Option<NumberInput>,
    pub inflation_pct: Option<NumberInput>,
    pub tax_pct: Option<NumberInput>,
    pub fee_mode: Option<FeeMode>,
    pub timing: Option<ContributionTiming>,
}

impl InvestPayload {
    pub fn resolve(&self, r: &mut Resolver<'_>) -> SimulationParameters {
        let d = SimulationParameters::default();
        SimulationParameters {
            start: r.number("start", self.start.as_ref(), d.start),
            monthly: r.number("monthly", self.monthly.as_ref(), d.monthly),
            years: r.number("years", self.years.as_ref(), d.years),
            annual_return_pct: r.number("returnPct", self.return_pct.as_ref(), d.annual_return_pct),
            annual_fee_pct: r.number("feePct", self.fee_pct.as_ref(), d.annual_fee_pct),
            inflation_pct: r.number("inflationPct", self.inflation_pct.as_ref(), d.inflation_pct),
            tax_pct: r.number("taxPct", self.tax_pct.as_ref(), d.tax_pct),
            fee_mode: r.choice("feeMode", self.fee_mode, d.fee_mode),
            timing: r.choice("timing", self.timing, d.timing),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtPayload {
    #[serde(alias = "amount")]
    pub principal: Option<NumberInput>,
    pub rate_pct: Option<NumberInput>,
    pub payment: Option<NumberInput>,
}

impl DebtPayload {
    pub fn resolve(&self, r: &mut Resolver<'_>) -> DebtParameters {
        let d = DebtParameters::default();
        DebtParameters {
            principal: r.number("principal", self.principal.as_ref(), d.principal),
            annual_rate_pct: r.number("ratePct", self.rate_pct.as_ref(), d.annual_rate_pct),
            monthly_payment: r.number("payment", self.payment.as_ref(), d.monthly_payment),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructurePayload {
    #[serde(alias = "type")]
    pub property_type: Option<PropertyType>,
    pub price: Option<NumberInput>,
    pub down_payment: Option<NumberInput>,
    pub primary_years: Option<NumberInput>,
    pub primary_interest_only_years: Option<NumberInput>,
    pub primary_rate_pct: Option<NumberInput>,
    pub secondary_years: Option<NumberInput>,
    pub secondary_rate_pct: Option<NumberInput>,
}

impl StructurePayload {
    pub fn resolve(&self, r: &mut Resolver<'_>) -> MortgageStructure {
        let d = MortgageStructure::default();
        let mut params = MortgageStructure {
            property_type: r.choice("propertyType", self.property_type, d.property_type),
            price: r.number("price", self.price.as_ref(), d.price),
            down_payment: r.number("downPayment", self.down_payment.as_ref(), d.down_payment),
            ..d
        };
        params.primary.years =
            r.number("primaryYears", self.primary_years.as_ref(), d.primary.years);
        params.primary.interest_only_years = r.number(
            "primaryInterestOnlyYears",
            self.primary_interest_only_years.as_ref(),
            d.primary.interest_only_years,
        );
        params.primary.rate_pct =
            r.number("primaryRatePct", self.primary_rate_pct.as_ref(), d.primary.rate_pct);
        params.secondary.years =
            r.number("secondaryYears", self.secondary_years.as_ref(), d.secondary.years);
        params.secondary.rate_pct = r.number(
            "secondaryRatePct",
            self.secondary_rate_pct.as_ref(),
            d.secondary.rate_pct,
        );
        params
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapacityPayload {
    pub income1: Option<NumberInput>,
    pub income2: Option<NumberInput>,
    pub tax_pct: Option<NumberInput>,
    pub housing_pct: Option<NumberInput>,
    pub obligations: Option<NumberInput>,
    pub rate_pct: Option<NumberInput>,
    pub years: Option<NumberInput>,
    pub interest_only_years: Option<NumberInput>,
    pub down_payment: Option<NumberInput>,
}

impl CapacityPayload {
    pub fn resolve(&self, r: &mut Resolver<'_>) -> MortgageCapacity {
        let d = MortgageCapacity::default();
        MortgageCapacity {
            income1: r.number("income1", self.income1.as_ref(), d.income1),
            income2: r.number("income2", self.income2.as_ref(), d.income2),
            tax_pct: r.number("taxPct", self.tax_pct.as_ref(), d.tax_pct),
            housing_share_pct: r.number(
                "housingPct",
                self.housing_pct.as_ref(),
                d.housing_share_pct,
            ),
            obligations: r.number("obligations", self.obligations.as_ref(), d.obligations),
            stress_rate_pct: r.number("ratePct", self.rate_pct.as_ref(), d.stress_rate_pct),
            years: r.number("years", self.years.as_ref(), d.years),
            interest_only_years: r.number(
                "interestOnlyYears",
                self.interest_only_years.as_ref(),
                d.interest_only_years,
            ),
            down_payment: r.number("downPayment", self.down_payment.as_ref(), d.down_payment),
        }
    }
}

/// Explicit sizing rule for one budget bucket.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketMode {
    #[serde(alias = "pct", alias = "percent")]
    Percentage,
    #[serde(alias = "fixed", alias = "fixedAmount")]
    FixedAmount,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BudgetPayload {
    pub salary_pre_tax: Option<NumberInput>,
    #[serde(alias = "amPct")]
    pub labour_market_pct: Option<NumberInput>,
    pub pension_pct: Option<NumberInput>,
    pub atp_fixed: Option<NumberInput>,
    #[serde(alias = "fradrag")]
    pub deduction: Option<NumberInput>,
    pub tax_rate_pct: Option<NumberInput>,
    pub essentials_mode: Option<BucketMode>,
    pub essentials_pct: Option<NumberInput>,
    pub essentials_fixed: Option<NumberInput>,
    pub fun_mode: Option<BucketMode>,
    pub fun_pct: Option<NumberInput>,
    pub fun_fixed: Option<NumberInput>,
    pub future_mode: Option<BucketMode>,
    pub future_pct: Option<NumberInput>,
    pub future_fixed: Option<NumberInput>,
}

impl BudgetPayload {
    pub fn resolve(&self, r: &mut Resolver<'_>) -> SalaryParameters {
        let d = SalaryParameters::default();
        SalaryParameters {
            salary_pre_tax: r.number("salaryPreTax", self.salary_pre_tax.as_ref(), d.salary_pre_tax),
            labour_market_pct: r.number(
                "labourMarketPct",
                self.labour_market_pct.as_ref(),
                d.labour_market_pct,
            ),
            pension_pct: r.number("pensionPct", self.pension_pct.as_ref(), d.pension_pct),
            atp_fixed: r.number("atpFixed", self.atp_fixed.as_ref(), d.atp_fixed),
            deduction: r.number("deduction", self.deduction.as_ref(), d.deduction),
            tax_rate_pct: r.number("taxRatePct", self.tax_rate_pct.as_ref(), d.tax_rate_pct),
            essentials: bucket(
                r,
                "essentials",
                self.essentials_mode,
                self.essentials_pct.as_ref(),
                self.essentials_fixed.as_ref(),
            ),
            fun: bucket(
                r,
                "fun",
                self.fun_mode,
                self.fun_pct.as_ref(),
                self.fun_fixed.as_ref(),
            ),
            future: bucket(
                r,
                "future",
                self.future_mode,
                self.future_pct.as_ref(),
                self.future_fixed.as_ref(),
            ),
        }
    }
}

/// Resolves one bucket. Without an explicit mode, a positive fixed amount
/// wins over the percentage; a fixed amount of zero cannot be told apart
/// from "not set" in that legacy form, so it means percentage.
///
/// A request that sends the percentage or the fixed amount but no mode
/// replaces any stored mode with the inferred one. Only a request that
/// leaves the whole bucket out reuses the stored mode.
fn bucket(
    r: &mut Resolver<'_>,
    name: &str,
    mode: Option<BucketMode>,
    pct: Option<&NumberInput>,
    fixed: Option<&NumberInput>,
) -> AllocationMode {
    let legacy_in_request = pct.is_some() || fixed.is_some();
    let pct = r.number(&format!("{name}Pct"), pct, 0.0).max(0.0);
    let fixed = r.number(&format!("{name}Fixed"), fixed, 0.0).max(0.0);
    let inferred = if fixed > 0.0 {
        BucketMode::FixedAmount
    } else {
        BucketMode::Percentage
    };
    let stored_mode_key = format!("{name}Mode");
    let mode = match mode {
        Some(mode) => r.choice(&stored_mode_key, Some(mode), mode),
        None if legacy_in_request => r.choice(&stored_mode_key, Some(inferred), inferred),
        None => r.store.decode(&r.key(&stored_mode_key), inferred),
    };
    match mode {
        BucketMode::Percentage => AllocationMode::Percentage(pct),
        BucketMode::FixedAmount => AllocationMode::FixedAmount(fixed),
    }
}

#[cfg(test)]
pub fn payload_from_json<T: DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str::<T>(json).map_err(|e| format!("Invalid API JSON payload: {e}"))
}
