use super::pct_to_rate;
use super::types::{
    ContributionTiming, FeeMode, InvestmentResult, SimulationParameters, YearlySeries,
};

/// Longest horizon the projection runs. Longer horizons are clamped.
pub const MAX_INVEST_YEARS: f64 = 200.0;

#[derive(Debug, Clone, Copy)]
struct Rates {
    growth_annual: f64,
    fee_annual: f64,
    inflation_annual: f64,
    tax: f64,
}

impl Rates {
    fn from_params(params: &SimulationParameters) -> Self {
        Self {
            growth_annual: pct_to_rate(params.annual_return_pct),
            fee_annual: pct_to_rate(params.annual_fee_pct),
            inflation_annual: pct_to_rate(params.inflation_pct),
            tax: pct_to_rate(params.tax_pct),
        }
    }

    fn monthly_growth(self, fee_mode: FeeMode) -> f64 {
        match fee_mode {
            FeeMode::Net => (self.growth_annual - self.fee_annual) / 12.0,
            FeeMode::Gains => (1.0 + self.growth_annual).powf(1.0 / 12.0) - 1.0,
        }
    }

    fn deflator(self, years: f64) -> f64 {
        (1.0 + self.inflation_annual).powf(years)
    }

    fn after_tax(self, balance: f64, contributed: f64) -> f64 {
        balance - self.tax * (balance - contributed).max(0.0)
    }
}

impl YearlySeries {
    fn with_capacity(years: usize) -> Self {
        let make = || Vec::with_capacity(years + 1);
        Self {
            nominal: make(),
            inflation_adjusted: make(),
            contributions: make(),
            after_tax: make(),
            after_tax_inflation_adjusted: make(),
        }
    }

    fn push(&mut self, rates: Rates, elapsed_years: f64, balance: f64, contributed: f64) {
        let deflator = rates.deflator(elapsed_years);
        let after_tax = rates.after_tax(balance, contributed);
        self.nominal.push(balance);
        self.inflation_adjusted.push(balance / deflator);
        self.contributions.push(contributed);
        self.after_tax.push(after_tax);
        self.after_tax_inflation_adjusted.push(after_tax / deflator);
    }
}

/// Projects an account balance month by month and samples it once a year.
///
/// Every rate is clamped to be non-negative. The horizon is clamped to
/// `0..=MAX_INVEST_YEARS` with NaN treated as zero, so every input yields a
/// result of bounded size.
pub fn simulate_investment(params: &SimulationParameters) -> InvestmentResult {
    let horizon = horizon_years(params.years);
    let months = (horizon * 12.0).round() as u32;
    let rates = Rates::from_params(params);
    let rate = rates.monthly_growth(params.fee_mode);
    let start = params.start;
    let monthly = params.monthly;

    let mut balance = start;
    let mut contributed = start;
    let mut yearly = YearlySeries::with_capacity((months / 12) as usize);
    yearly.push(rates, 0.0, balance, start);

    for month in 1..=months {
        if params.timing == ContributionTiming::Begin {
            balance += monthly;
            contributed += monthly;
        }
        balance *= 1.0 + rate;
        if params.timing == ContributionTiming::End {
            balance += monthly;
            contributed += monthly;
        }

        if month % 12 != 0 {
            continue;
        }
        if params.fee_mode == FeeMode::Gains {
            balance -= (balance - contributed).max(0.0) * rates.fee_annual;
        }
        let cumulative = start + monthly * month as f64;
        yearly.push(rates, (month / 12) as f64, balance, cumulative);
    }

    let gains = (balance - contributed).max(0.0);
    let est_tax = gains * rates.tax;
    let after_tax = balance - est_tax;
    let deflator = rates.deflator(horizon);

    InvestmentResult {
        before_tax: balance,
        gains,
        est_tax,
        after_tax,
        after_inflation: balance / deflator,
        after_tax_inflation: after_tax / deflator,
        total_contrib: contributed,
        effective_monthly_rate: rate,
        yearly,
    }
}

fn horizon_years(years: f64) -> f64 {
    // `max` maps NaN to zero.
    years.max(0.0).min(MAX_INVEST_YEARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_params() -> SimulationParameters {
        SimulationParameters {
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

    #[test]
    fn zero_years_returns_single_point_at_start() {
        let mut params = sample_params();
        params.start = 50_000.0;
        params.years = 0.0;

        let result = simulate_investment(&params);
        assert_eq!(result.yearly.nominal.len(), 1);
        assert_approx(result.before_tax, 50_000.0);
        assert_approx(result.total_contrib, 50_000.0);
        assert_approx(result.gains, 0.0);
        assert_approx(result.yearly.nominal[0], 50_000.0);
        assert_approx(result.yearly.inflation_adjusted[0], 50_000.0);
        assert_approx(result.yearly.contributions[0], 50_000.0);
        assert_approx(result.yearly.after_tax[0], 50_000.0);
        assert_approx(result.yearly.after_tax_inflation_adjusted[0], 50_000.0);
    }

    #[test]
    fn negative_horizon_is_treated_as_zero() {
        let mut params = sample_params();
        params.start = 1_000.0;
        params.years = -4.0;

        let result = simulate_investment(&params);
        assert_eq!(result.yearly.nominal.len(), 1);
        assert_approx(result.before_tax, 1_000.0);
        assert_approx(result.after_inflation, 1_000.0);
    }

    #[test]
    fn zero_rates_accumulate_contributions_only() {
        let mut params = sample_params();
        params.start = 1_000.0;
        params.monthly = 100.0;
        params.years = 2.0;
        params.annual_return_pct = 0.0;
        params.annual_fee_pct = 0.0;
        params.inflation_pct = 0.0;

        let result = simulate_investment(&params);
        assert_approx(result.before_tax, 3_400.0);
        assert_approx(result.total_contrib, 3_400.0);
        assert_approx(result.est_tax, 0.0);
        assert_eq!(result.yearly.contributions, vec![1_000.0, 2_200.0, 3_400.0]);
    }

    #[test]
    fn begin_timing_earns_one_more_month_of_growth_than_end() {
        let mut params = sample_params();
        params.years = 1.0;
        params.annual_fee_pct = 0.0;
        params.annual_return_pct = 12.0;

        params.timing = ContributionTiming::Begin;
        let begin = simulate_investment(&params);
        params.timing = ContributionTiming::End;
        let end = simulate_investment(&params);

        assert!(begin.before_tax > end.before_tax);
        assert_approx(begin.total_contrib, end.total_contrib);
        assert_approx(begin.before_tax, end.before_tax * 1.01);
    }

    #[test]
    fn net_fee_mode_uses_simple_monthly_rate() {
        let params = sample_params();
        let result = simulate_investment(&params);
        assert_approx(result.effective_monthly_rate, (0.08 - 0.01) / 12.0);
    }

    #[test]
    fn gains_fee_mode_uses_geometric_rate_and_charges_yearly() {
        let mut params = sample_params();
        params.fee_mode = FeeMode::Gains;
        params.start = 10_000.0;
        params.monthly = 0.0;
        params.years = 1.0;
        params.annual_fee_pct = 10.0;

        let result = simulate_investment(&params);
        assert_approx(result.effective_monthly_rate, 1.08f64.powf(1.0 / 12.0) - 1.0);
        // 10_800 after growth, 10% of the 800 gain charged.
        assert_approx(result.before_tax, 10_720.0);
        assert_approx(result.yearly.nominal[1], 10_720.0);
    }

    #[test]
    fn tax_applies_to_gains_only() {
        let mut params = sample_params();
        params.start = 10_000.0;
        params.monthly = 0.0;
        params.years = 1.0;
        params.annual_fee_pct = 0.0;
        params.annual_return_pct = 12.0;
        params.tax_pct = 50.0;

        let result = simulate_investment(&params);
        let expected_balance = 10_000.0 * 1.01f64.powi(12);
        assert_approx(result.before_tax, expected_balance);
        assert_approx(result.gains, expected_balance - 10_000.0);
        assert_approx(result.est_tax, (expected_balance - 10_000.0) * 0.5);
        assert_approx(result.after_tax, result.yearly.after_tax[1]);
    }

    #[test]
    fn inflation_deflates_by_full_fractional_horizon() {
        let mut params = sample_params();
        params.start = 1_000.0;
        params.monthly = 0.0;
        params.years = 1.5;
        params.annual_return_pct = 0.0;
        params.annual_fee_pct = 0.0;
        params.inflation_pct = 10.0;

        let result = simulate_investment(&params);
        assert_eq!(result.yearly.nominal.len(), 2);
        assert_approx(result.yearly.inflation_adjusted[1], 1_000.0 / 1.1);
        assert_approx(result.after_inflation, 1_000.0 / 1.1f64.powf(1.5));
    }

    #[test]
    fn huge_horizon_is_clamped() {
        let mut params = sample_params();
        params.years = 1e9;
        let clamped = simulate_investment(&params);
        assert_eq!(clamped.yearly.nominal.len(), MAX_INVEST_YEARS as usize + 1);
        assert!(clamped.before_tax.is_finite());

        params.years = MAX_INVEST_YEARS;
        assert_eq!(simulate_investment(&params), clamped);

        params.years = f64::INFINITY;
        assert_eq!(simulate_investment(&params), clamped);
    }

    #[test]
    fn nan_horizon_is_treated_as_zero() {
        let mut params = sample_params();
        params.start = 500.0;
        params.years = f64::NAN;
        let result = simulate_investment(&params);
        assert_eq!(result.yearly.nominal.len(), 1);
        assert_approx(result.before_tax, 500.0);
    }

    #[test]
    fn negative_rates_are_clamped_to_zero() {
        let mut params = sample_params();
        params.start = 1_000.0;
        params.monthly = 0.0;
        params.years = 3.0;
        params.annual_return_pct = -20.0;
        params.annual_fee_pct = -5.0;
        params.inflation_pct = -3.0;
        params.tax_pct = -10.0;

        let result = simulate_investment(&params);
        assert_approx(result.before_tax, 1_000.0);
        assert_approx(result.after_tax_inflation, 1_000.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_series_length_matches_whole_years(
            years in 0u32..60,
            start in 0u32..500_000,
            monthly in 0u32..20_000,
            return_bp in 0u32..1500,
            gains_mode in proptest::bool::ANY,
            end_timing in proptest::bool::ANY
        ) {
            let mut params = sample_params();
            params.years = years as f64;
            params.start = start as f64;
            params.monthly = monthly as f64;
            params.annual_return_pct = return_bp as f64 / 100.0;
            params.fee_mode = if gains_mode { FeeMode::Gains } else { FeeMode::Net };
            params.timing = if end_timing { ContributionTiming::End } else { ContributionTiming::Begin };

            let result = simulate_investment(&params);
            let expected = years as usize + 1;
            prop_assert_eq!(result.yearly.nominal.len(), expected);
            prop_assert_eq!(result.yearly.inflation_adjusted.len(), expected);
            prop_assert_eq!(result.yearly.contributions.len(), expected);
            prop_assert_eq!(result.yearly.after_tax.len(), expected);
            prop_assert_eq!(result.yearly.after_tax_inflation_adjusted.len(), expected);
            prop_assert_eq!(result.yearly.nominal[0], params.start);
        }

        #[test]
        fn prop_simulation_is_idempotent(
            years_tenths in 0u32..400,
            start in 0u32..300_000,
            monthly in 0u32..10_000,
            fee_bp in 0u32..300
        ) {
            let mut params = sample_params();
            params.years = years_tenths as f64 / 10.0;
            params.start = start as f64;
            params.monthly = monthly as f64;
            params.annual_fee_pct = fee_bp as f64 / 100.0;

            prop_assert_eq!(simulate_investment(&params), simulate_investment(&params));
        }

        #[test]
        fn prop_higher_fee_strictly_lowers_before_tax(
            years in 1u32..40,
            start in 1_000u32..300_000,
            monthly in 0u32..10_000,
            return_bp in 100u32..1500,
            fee_bp in 0u32..300,
            fee_step_bp in 10u32..200,
            gains_mode in proptest::bool::ANY
        ) {
            let mut params = sample_params();
            params.years = years as f64;
            params.start = start as f64;
            params.monthly = monthly as f64;
            params.annual_return_pct = return_bp as f64 / 100.0;
            params.fee_mode = if gains_mode { FeeMode::Gains } else { FeeMode::Net };
            params.annual_fee_pct = fee_bp as f64 / 100.0;
            let low_fee = simulate_investment(&params);

            params.annual_fee_pct = (fee_bp + fee_step_bp) as f64 / 100.0;
            let high_fee = simulate_investment(&params);

            prop_assert!(high_fee.before_tax < low_fee.before_tax);
        }
    }
}
