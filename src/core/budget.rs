use super::types::{AllocationMode, BudgetResult, SalaryParameters};

impl AllocationMode {
    /// Amount this bucket takes out of `salary_after_tax`.
    pub fn amount(self, salary_after_tax: f64) -> f64 {
        match self {
            AllocationMode::Percentage(pct) => salary_after_tax * pct.max(0.0) / 100.0,
            AllocationMode::FixedAmount(amount) => amount.max(0.0),
        }
    }

    fn percentage(self) -> f64 {
        match self {
            AllocationMode::Percentage(pct) => pct.max(0.0),
            AllocationMode::FixedAmount(_) => 0.0,
        }
    }
}

/// Monthly take-home pay and its split into essentials, fun and future.
pub fn compute_budget(params: &SalaryParameters) -> BudgetResult {
    let salary_pre_tax = params.salary_pre_tax;
    let labour_market_contribution = salary_pre_tax * params.labour_market_pct.max(0.0) / 100.0;
    let pension = salary_pre_tax * params.pension_pct.max(0.0) / 100.0;
    let atp = params.atp_fixed.max(0.0);

    let amount_before_deduction = salary_pre_tax - labour_market_contribution - pension - atp;
    let deduction = params.deduction.max(0.0);
    let taxable_base = (amount_before_deduction - deduction).max(0.0);
    let taxed_amount = taxable_base * params.tax_rate_pct.max(0.0) / 100.0;
    let salary_after_tax = amount_before_deduction - taxed_amount;

    let buckets = [params.essentials, params.fun, params.future];
    let [essentials, fun, future] = buckets.map(|bucket| bucket.amount(salary_after_tax));
    let allocated = essentials + fun + future;
    let leftover = salary_after_tax - allocated;
    let pct_used = if salary_after_tax > 0.0 {
        allocated / salary_after_tax * 100.0
    } else {
        0.0
    };

    BudgetResult {
        salary_pre_tax,
        labour_market_contribution,
        pension,
        atp,
        amount_before_deduction,
        deduction,
        amount_after_deduction: amount_before_deduction - deduction,
        taxed_amount,
        salary_after_tax,
        essentials,
        fun,
        future,
        allocated,
        leftover,
        pct_used,
        pct_sum: buckets.iter().map(|bucket| bucket.percentage()).sum(),
        over_allocated: leftover < 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_params() -> SalaryParameters {
        SalaryParameters {
            salary_pre_tax: 40_000.0,
            labour_market_pct: 8.0,
            pension_pct: 3.0,
            atp_fixed: 99.0,
            deduction: 9_868.0,
            tax_rate_pct: 36.0,
            essentials: AllocationMode::Percentage(50.0),
            fun: AllocationMode::Percentage(30.0),
            future: AllocationMode::Percentage(20.0),
        }
    }

    #[test]
    fn take_home_pay_follows_deduction_chain() {
        let result = compute_budget(&sample_params());
        assert_approx(result.labour_market_contribution, 3_200.0);
        assert_approx(result.pension, 1_200.0);
        assert_approx(result.atp, 99.0);
        assert_approx(result.amount_before_deduction, 35_501.0);
        assert_approx(result.amount_after_deduction, 25_633.0);
        assert_approx(result.taxed_amount, 25_633.0 * 0.36);
        assert_approx(result.salary_after_tax, 35_501.0 - 25_633.0 * 0.36);
    }

    #[test]
    fn full_percentage_split_leaves_nothing() {
        let result = compute_budget(&sample_params());
        assert_approx(result.allocated, result.salary_after_tax);
        assert_approx(result.leftover, 0.0);
        assert_approx(result.pct_used, 100.0);
        assert_approx(result.pct_sum, 100.0);
    }

    #[test]
    fn fixed_amount_replaces_percentage() {
        let mut params = sample_params();
        params.fun = AllocationMode::FixedAmount(2_500.0);
        let result = compute_budget(&params);
        assert_approx(result.fun, 2_500.0);
        assert_approx(result.pct_sum, 70.0);
    }

    #[test]
    fn fixed_zero_is_respected() {
        let mut params = sample_params();
        params.future = AllocationMode::FixedAmount(0.0);
        let result = compute_budget(&params);
        assert_approx(result.future, 0.0);
        assert!(result.leftover > 0.0);
    }

    #[test]
    fn over_allocation_is_flagged() {
        let mut params = sample_params();
        params.essentials = AllocationMode::FixedAmount(100_000.0);
        let result = compute_budget(&params);
        assert!(result.leftover < 0.0);
        assert!(result.over_allocated);
        assert!(result.pct_used > 100.0);
    }

    #[test]
    fn deduction_larger_than_income_means_no_tax() {
        let mut params = sample_params();
        params.deduction = 100_000.0;
        let result = compute_budget(&params);
        assert_approx(result.taxed_amount, 0.0);
        assert_approx(result.salary_after_tax, result.amount_before_deduction);
    }

    #[test]
    fn zero_salary_reports_zero_usage() {
        let mut params = sample_params();
        params.salary_pre_tax = 0.0;
        params.atp_fixed = 0.0;
        let result = compute_budget(&params);
        assert_approx(result.salary_after_tax, 0.0);
        assert_approx(result.pct_used, 0.0);
    }
}
