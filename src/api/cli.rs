use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::core::{
    AllocationMode, ContributionTiming, DebtParameters, FeeMode, MortgageCapacity,
    MortgageStructure, PropertyType, SalaryParameters, SimulationParameters, compute_budget,
    compute_mortgage_capacity, compute_mortgage_structure, simulate_debt_payoff,
    simulate_investment,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFeeMode {
    Net,
    Gains,
}

impl From<CliFeeMode> for FeeMode {
    fn from(value: CliFeeMode) -> Self {
        match value {
            CliFeeMode::Net => FeeMode::Net,
            CliFeeMode::Gains => FeeMode::Gains,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTiming {
    Begin,
    End,
}

impl From<CliTiming> for ContributionTiming {
    fn from(value: CliTiming) -> Self {
        match value {
            CliTiming::Begin => ContributionTiming::Begin,
            CliTiming::End => ContributionTiming::End,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPropertyType {
    YearRound,
    Holiday,
    Cooperative,
}

impl From<CliPropertyType> for PropertyType {
    fn from(value: CliPropertyType) -> Self {
        match value {
            CliPropertyType::YearRound => PropertyType::YearRound,
            CliPropertyType::Holiday => PropertyType::Holiday,
            CliPropertyType::Cooperative => PropertyType::Cooperative,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "finplan",
    about = "Personal finance calculator (budget, investing, debt payoff, mortgage)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, env = "FINPLAN_PORT", default_value_t = 8080)]
        port: u16,
        #[arg(
            long,
            env = "FINPLAN_STORE",
            default_value = "finplan-fields.json",
            help = "JSON file holding the remembered form fields"
        )]
        store: PathBuf,
    },
    /// Project an investment account.
    Invest(InvestArgs),
    /// Plan a debt payoff at a fixed monthly payment.
    Debt(DebtArgs),
    /// Split a property purchase between mortgage and bank loan.
    MortgageStructure(StructureArgs),
    /// Estimate how much a household can borrow.
    MortgageCapacity(CapacityArgs),
    /// Split a monthly salary into a budget.
    Budget(BudgetArgs),
}

#[derive(Args, Debug)]
pub struct InvestArgs {
    #[arg(long, default_value_t = 0.0)]
    start: f64,
    #[arg(long, default_value_t = 6_000.0)]
    monthly: f64,
    #[arg(long, default_value_t = 30.0, help = "Horizon in years, at most 200")]
    years: f64,
    #[arg(long, default_value_t = 8.0, help = "Expected annual return in percent")]
    return_pct: f64,
    #[arg(long, default_value_t = 1.0, help = "Annual fee in percent")]
    fee_pct: f64,
    #[arg(long, default_value_t = 2.0)]
    inflation_pct: f64,
    #[arg(long, default_value_t = 27.0, help = "Tax on gains in percent")]
    tax_pct: f64,
    #[arg(long, value_enum, default_value_t = CliFeeMode::Net)]
    fee_mode: CliFeeMode,
    #[arg(long, value_enum, default_value_t = CliTiming::Begin)]
    timing: CliTiming,
}

impl From<InvestArgs> for SimulationParameters {
    fn from(args: InvestArgs) -> Self {
        SimulationParameters {
            start: args.start,
            monthly: args.monthly,
            years: args.years,
            annual_return_pct: args.return_pct,
            annual_fee_pct: args.fee_pct,
            inflation_pct: args.inflation_pct,
            tax_pct: args.tax_pct,
            fee_mode: args.fee_mode.into(),
            timing: args.timing.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct DebtArgs {
    #[arg(long, default_value_t = 480_000.0)]
    principal: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual interest rate in percent")]
    rate_pct: f64,
    #[arg(long, default_value_t = 4_084.0)]
    payment: f64,
}

impl From<DebtArgs> for DebtParameters {
    fn from(args: DebtArgs) -> Self {
        DebtParameters {
            principal: args.principal,
            annual_rate_pct: args.rate_pct,
            monthly_payment: args.payment,
        }
    }
}

#[derive(Args, Debug)]
pub struct StructureArgs {
    #[arg(long, value_enum, default_value_t = CliPropertyType::YearRound)]
    property_type: CliPropertyType,
    #[arg(long, default_value_t = 2_500_000.0)]
    price: f64,
    #[arg(long, default_value_t = 300_000.0)]
    down_payment: f64,
    #[arg(long, default_value_t = 30.0)]
    primary_years: f64,
    #[arg(long, default_value_t = 0.0, help = "Interest-only years, at most 10")]
    primary_interest_only_years: f64,
    #[arg(long, default_value_t = 4.0)]
    primary_rate_pct: f64,
    #[arg(long, default_value_t = 30.0)]
    secondary_years: f64,
    #[arg(long, default_value_t = 7.0)]
    secondary_rate_pct: f64,
}

impl From<StructureArgs> for MortgageStructure {
    fn from(args: StructureArgs) -> Self {
        let mut params = MortgageStructure {
            property_type: args.property_type.into(),
            price: args.price,
            down_payment: args.down_payment,
            ..MortgageStructure::default()
        };
        params.primary.years = args.primary_years;
        params.primary.interest_only_years = args.primary_interest_only_years;
        params.primary.rate_pct = args.primary_rate_pct;
        params.secondary.years = args.secondary_years;
        params.secondary.rate_pct = args.secondary_rate_pct;
        params
    }
}

#[derive(Args, Debug)]
pub struct CapacityArgs {
    #[arg(long, default_value_t = 450_000.0, help = "Annual gross income")]
    income1: f64,
    #[arg(long, default_value_t = 0.0, help = "Second earner's annual gross income")]
    income2: f64,
    #[arg(long, default_value_t = 38.0, help = "Effective tax rate, 0-60%")]
    tax_pct: f64,
    #[arg(long, default_value_t = 30.0, help = "Share of net income for housing, 5-60%")]
    housing_pct: f64,
    #[arg(long, default_value_t = 0.0, help = "Other monthly obligations")]
    obligations: f64,
    #[arg(long, default_value_t = 6.0, help = "Stress-test interest rate in percent")]
    rate_pct: f64,
    #[arg(long, default_value_t = 30.0)]
    years: f64,
    #[arg(long, default_value_t = 0.0)]
    interest_only_years: f64,
    #[arg(long, default_value_t = 300_000.0)]
    down_payment: f64,
}

impl From<CapacityArgs> for MortgageCapacity {
    fn from(args: CapacityArgs) -> Self {
        MortgageCapacity {
            income1: args.income1,
            income2: args.income2,
            tax_pct: args.tax_pct,
            housing_share_pct: args.housing_pct,
            obligations: args.obligations,
            stress_rate_pct: args.rate_pct,
            years: args.years,
            interest_only_years: args.interest_only_years,
            down_payment: args.down_payment,
        }
    }
}

#[derive(Args, Debug)]
pub struct BudgetArgs {
    #[arg(long, default_value_t = 40_000.0, help = "Monthly salary before tax")]
    salary: f64,
    #[arg(long, default_value_t = 8.0, help = "Labour market contribution in percent")]
    labour_market_pct: f64,
    #[arg(long, default_value_t = 3.0)]
    pension_pct: f64,
    #[arg(long, default_value_t = 99.0)]
    atp: f64,
    #[arg(long, default_value_t = 9_868.0, help = "Monthly tax deduction")]
    deduction: f64,
    #[arg(long, default_value_t = 36.0)]
    tax_rate_pct: f64,
    #[arg(long, default_value_t = 0.0)]
    essentials_pct: f64,
    #[arg(long, help = "Fixed essentials amount; overrides --essentials-pct")]
    essentials_fixed: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    fun_pct: f64,
    #[arg(long, help = "Fixed fun amount; overrides --fun-pct")]
    fun_fixed: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    future_pct: f64,
    #[arg(long, help = "Fixed future amount; overrides --future-pct")]
    future_fixed: Option<f64>,
}

fn allocation(pct: f64, fixed: Option<f64>) -> AllocationMode {
    match fixed {
        Some(amount) => AllocationMode::FixedAmount(amount),
        None => AllocationMode::Percentage(pct),
    }
}

impl From<BudgetArgs> for SalaryParameters {
    fn from(args: BudgetArgs) -> Self {
        SalaryParameters {
            salary_pre_tax: args.salary,
            labour_market_pct: args.labour_market_pct,
            pension_pct: args.pension_pct,
            atp_fixed: args.atp,
            deduction: args.deduction,
            tax_rate_pct: args.tax_rate_pct,
            essentials: allocation(args.essentials_pct, args.essentials_fixed),
            fun: allocation(args.fun_pct, args.fun_fixed),
            future: allocation(args.future_pct, args.future_fixed),
        }
    }
}

/// Runs a calculator subcommand and renders its result as pretty JSON.
/// Returns `None` for `serve`, which the binary handles itself.
pub fn run_cli(command: Command) -> Option<Result<String, serde_json::Error>> {
    fn render<T: Serialize>(value: &T) -> Option<Result<String, serde_json::Error>> {
        Some(serde_json::to_string_pretty(value))
    }

    match command {
        Command::Serve { .. } => None,
        Command::Invest(args) => render(&simulate_investment(&args.into())),
        Command::Debt(args) => render(&simulate_debt_payoff(&args.into())),
        Command::MortgageStructure(args) => render(&compute_mortgage_structure(&args.into())),
        Command::MortgageCapacity(args) => render(&compute_mortgage_capacity(&args.into())),
        Command::Budget(args) => render(&compute_budget(&args.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("finplan").chain(args.iter().copied()))
            .expect("valid arguments")
            .command
    }

    fn run_json(args: &[&str]) -> Value {
        let rendered = run_cli(parse(args))
            .expect("calculator command")
            .expect("serializable result");
        serde_json::from_str(&rendered).expect("valid json")
    }

    #[test]
    fn serve_defaults_to_port_8080() {
        match parse(&["serve"]) {
            Command::Serve { port, store } => {
                assert_eq!(port, 8080);
                assert_eq!(store, PathBuf::from("finplan-fields.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(run_cli(parse(&["serve", "--port", "9000"])).is_none());
    }

    #[test]
    fn debt_command_uses_defaults() {
        let body = run_json(&["debt"]);
        assert_eq!(body["feasible"], Value::Bool(true));
        assert!(body["months"].as_u64().is_some_and(|m| m > 0));
    }

    #[test]
    fn mortgage_structure_accepts_property_type() {
        let body = run_json(&["mortgage-structure", "--property-type", "cooperative"]);
        assert_eq!(body["primaryLoan"].as_f64(), Some(0.0));
        assert_eq!(body["secondaryLoan"].as_f64(), Some(2_200_000.0));
    }

    #[test]
    fn invest_command_accepts_enums() {
        let body = run_json(&[
            "invest", "--years", "5", "--fee-mode", "gains", "--timing", "end",
        ]);
        assert_eq!(body["yearly"]["nominal"].as_array().map(Vec::len), Some(6));
    }

    #[test]
    fn budget_fixed_flag_overrides_percentage() {
        let body = run_json(&[
            "budget",
            "--essentials-pct",
            "50",
            "--essentials-fixed",
            "0",
            "--fun-pct",
            "10",
        ]);
        assert_eq!(body["essentials"].as_f64(), Some(0.0));
        assert_eq!(body["pctSum"].as_f64(), Some(10.0));
    }

    #[test]
    fn unknown_property_type_is_rejected() {
        let err = Cli::try_parse_from(["finplan", "mortgage-structure", "--property-type", "castle"])
            .expect_err("must reject unknown property type");
        assert!(err.to_string().contains("castle"));
    }
}
