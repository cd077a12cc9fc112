use crate::accounting::verify_accounting_equation;
use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fields a period must carry, non-null, to survive the completeness filter.
pub const REQUIRED_PERIOD_FIELDS: [&str; 9] = [
    "period_end_date",
    "revenue",
    "cogs",
    "ebit",
    "net_income",
    "assets",
    "liabilities",
    "equity",
    "ocf",
];

pub const DEFAULT_REPORTING_UNIT: &str = "thousands";

fn default_reporting_unit() -> String {
    DEFAULT_REPORTING_UNIT.to_string()
}

/// Unvalidated figures for one reporting period, as the language model returns them.
///
/// This is also the shape advertised to the model through the generated JSON schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PeriodInput {
    #[schemars(description = "End date of the reporting period in YYYY-MM-DD format (e.g. 2023-12-31).")]
    pub period_end_date: NaiveDate,

    #[schemars(description = "Total revenue from sales. Must be non-negative.")]
    pub revenue: f64,

    #[schemars(description = "Cost of goods sold.")]
    pub cogs: f64,

    #[schemars(description = "Earnings before interest and taxes (operating profit). Negative for an operating loss.")]
    pub ebit: f64,

    #[schemars(description = "Net income attributable to the period. Negative for a net loss.")]
    pub net_income: f64,

    #[serde(default)]
    #[schemars(description = "Depreciation and amortization for the period. Use 0 or null if not disclosed.")]
    pub depreciation_amortization: Option<f64>,

    #[schemars(description = "Total assets. Must be non-negative.")]
    pub assets: f64,

    #[schemars(
        description = "Total liabilities ONLY (excluding equity). Never use the 'total liabilities and equity' line here."
    )]
    pub liabilities: f64,

    #[schemars(description = "Total equity.")]
    pub equity: f64,

    #[schemars(description = "Net cash flow from operating activities.")]
    pub ocf: f64,

    #[serde(default)]
    #[schemars(description = "Weighted average number of shares outstanding, in units (not thousands).")]
    pub shares_outstanding: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Interest-bearing debt: loans, bonds and leases. Excludes trade payables.")]
    pub total_debt: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Cash and cash equivalents at period end.")]
    pub cash_and_equivalents: Option<f64>,
}

/// The complete JSON object the model is asked to return.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionPayload {
    #[schemars(description = "Legal name of the reporting company.")]
    pub company_name: String,

    #[schemars(description = "ISO currency code of the reported figures (e.g. PLN, EUR, USD).")]
    pub reporting_currency: String,

    #[serde(default = "default_reporting_unit")]
    #[schemars(description = "Scale of the reported figures: 'units', 'thousands' or 'millions'.")]
    pub reporting_unit: String,

    #[schemars(description = "One entry per reporting period found in the document, newest first.")]
    pub periods: Vec<PeriodInput>,
}

impl ExtractionPayload {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ExtractionPayload)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// One validated reporting period of one company.
///
/// Can only be obtained through [`FinancialPeriod::try_new`] (or deserialization, which
/// goes through the same gate), so every instance satisfies the accounting identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PeriodInput")]
pub struct FinancialPeriod {
    period_end_date: NaiveDate,
    revenue: f64,
    cogs: f64,
    ebit: f64,
    net_income: f64,
    depreciation_amortization: f64,
    assets: f64,
    liabilities: f64,
    equity: f64,
    ocf: f64,
    shares_outstanding: Option<f64>,
    total_debt: Option<f64>,
    cash_and_equivalents: Option<f64>,
}

impl FinancialPeriod {
    pub fn try_new(input: PeriodInput) -> Result<Self> {
        for (field, value) in [
            ("revenue", input.revenue),
            ("assets", input.assets),
            ("liabilities", input.liabilities),
        ] {
            if value < 0.0 {
                return Err(ReportError::NegativeValue { field, value });
            }
        }

        verify_accounting_equation(
            input.period_end_date,
            input.assets,
            input.liabilities,
            input.equity,
        )?;

        Ok(Self {
            period_end_date: input.period_end_date,
            revenue: input.revenue,
            cogs: input.cogs,
            ebit: input.ebit,
            net_income: input.net_income,
            depreciation_amortization: input.depreciation_amortization.unwrap_or(0.0),
            assets: input.assets,
            liabilities: input.liabilities,
            equity: input.equity,
            ocf: input.ocf,
            shares_outstanding: input.shares_outstanding,
            total_debt: input.total_debt,
            cash_and_equivalents: input.cash_and_equivalents,
        })
    }

    pub fn period_end_date(&self) -> NaiveDate {
        self.period_end_date
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    pub fn cogs(&self) -> f64 {
        self.cogs
    }

    pub fn ebit(&self) -> f64 {
        self.ebit
    }

    pub fn net_income(&self) -> f64 {
        self.net_income
    }

    pub fn depreciation_amortization(&self) -> f64 {
        self.depreciation_amortization
    }

    pub fn assets(&self) -> f64 {
        self.assets
    }

    pub fn liabilities(&self) -> f64 {
        self.liabilities
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn ocf(&self) -> f64 {
        self.ocf
    }

    pub fn shares_outstanding(&self) -> Option<f64> {
        self.shares_outstanding
    }

    pub fn total_debt(&self) -> Option<f64> {
        self.total_debt
    }

    pub fn cash_and_equivalents(&self) -> Option<f64> {
        self.cash_and_equivalents
    }
}

impl TryFrom<PeriodInput> for FinancialPeriod {
    type Error = ReportError;

    fn try_from(input: PeriodInput) -> Result<Self> {
        Self::try_new(input)
    }
}

/// A company identity plus its validated periods, one per processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyReport {
    company_name: String,
    reporting_currency: String,
    #[serde(default = "default_reporting_unit")]
    reporting_unit: String,
    periods: Vec<FinancialPeriod>,
}

impl CompanyReport {
    pub fn new(
        company_name: impl Into<String>,
        reporting_currency: impl Into<String>,
        reporting_unit: impl Into<String>,
        periods: Vec<FinancialPeriod>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            reporting_currency: reporting_currency.into(),
            reporting_unit: reporting_unit.into(),
            periods,
        }
    }

    /// Validates every period of an extraction payload; the first violation fails the whole report.
    pub fn try_from_payload(payload: ExtractionPayload) -> Result<Self> {
        let periods = payload
            .periods
            .into_iter()
            .map(FinancialPeriod::try_new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(
            payload.company_name,
            payload.reporting_currency,
            payload.reporting_unit,
            periods,
        ))
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn reporting_currency(&self) -> &str {
        &self.reporting_currency
    }

    pub fn reporting_unit(&self) -> &str {
        &self.reporting_unit
    }

    pub fn periods(&self) -> &[FinancialPeriod] {
        &self.periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn input(assets: f64, liabilities: f64, equity: f64) -> PeriodInput {
        PeriodInput {
            period_end_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            revenue: 1000.0,
            cogs: 500.0,
            ebit: 200.0,
            net_income: 150.0,
            assets,
            liabilities,
            equity,
            ocf: 250.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_period() {
        let period = FinancialPeriod::try_new(input(1000.0, 400.0, 600.0)).unwrap();
        assert_eq!(period.assets(), 1000.0);
        assert_eq!(period.liabilities() + period.equity(), 1000.0);
        assert_eq!(period.depreciation_amortization(), 0.0);
        assert_eq!(period.shares_outstanding(), None);
    }

    #[test]
    fn test_invalid_equation_is_rejected() {
        let err = FinancialPeriod::try_new(input(1000.0, 400.0, 500.0)).unwrap_err();
        assert!(matches!(err, ReportError::AccountingIdentityViolation { .. }));
        assert_eq!(err.kind(), ErrorKind::DataQuality);
    }

    #[test]
    fn test_negative_revenue_is_rejected() {
        let mut bad = input(1000.0, 400.0, 600.0);
        bad.revenue = -100.0;
        let err = FinancialPeriod::try_new(bad).unwrap_err();
        assert!(matches!(
            err,
            ReportError::NegativeValue {
                field: "revenue",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_equity_is_allowed() {
        // Insolvent companies report negative equity; only the identity matters.
        let period = FinancialPeriod::try_new(input(1000.0, 1200.0, -200.0)).unwrap();
        assert_eq!(period.equity(), -200.0);
    }

    #[test]
    fn test_deserialization_goes_through_validation() {
        let ok = r#"{"period_end_date":"2024-12-31","revenue":1000,"cogs":600,"ebit":300,
            "net_income":240,"depreciation_amortization":null,"assets":2000,"liabilities":1000,
            "equity":1000,"ocf":350}"#;
        let period: FinancialPeriod = serde_json::from_str(ok).unwrap();
        assert_eq!(period.depreciation_amortization(), 0.0);

        let bad = ok.replace("\"equity\":1000", "\"equity\":500");
        assert!(serde_json::from_str::<FinancialPeriod>(&bad).is_err());
    }

    #[test]
    fn test_report_defaults_unit() {
        let json = r#"{"company_name":"Test Corp","reporting_currency":"PLN","periods":[]}"#;
        let report: CompanyReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.reporting_unit(), "thousands");
        assert!(report.periods().is_empty());
    }

    #[test]
    fn test_payload_with_one_bad_period_fails_whole_report() {
        let payload = ExtractionPayload {
            company_name: "Test Corp".to_string(),
            reporting_currency: "PLN".to_string(),
            reporting_unit: "thousands".to_string(),
            periods: vec![input(1000.0, 400.0, 600.0), input(1000.0, 1000.0, 1000.0)],
        };
        assert!(CompanyReport::try_from_payload(payload).is_err());
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ExtractionPayload::schema_as_json().unwrap();
        for field in REQUIRED_PERIOD_FIELDS {
            assert!(schema_json.contains(field), "schema missing {}", field);
        }
        assert!(schema_json.contains("shares_outstanding"));
        assert!(schema_json.contains("reporting_currency"));
    }
}
