//! Multi-report aggregation into one normalized KPI table.
//!
//! Every period of every report becomes one [`KpiRow`]: monetary fields converted to
//! the target currency, shares checked for a missed "in thousands" note, margins and
//! returns derived, and year-over-year growth attached per company. The result is
//! rebuilt from scratch on every call and never mutated afterwards.

use crate::config::AggregationConfig;
use crate::error::{ReportError, Result};
use crate::forecast::{ForecastPoint, SeriesKind};
use crate::schema::{CompanyReport, FinancialPeriod};
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Shares below this count are suspicious when revenue is large.
pub const SHARE_SCALE_MAX_SHARES: f64 = 10_000_000.0;
/// Revenue above which a small share count is treated as a unit mistake.
pub const SHARE_SCALE_MIN_REVENUE: f64 = 500_000_000.0;
pub const SHARE_SCALE_FACTOR: f64 = 1000.0;

/// Stable presentation order. Tables expose only the columns that carry data.
pub const PRESENTATION_COLUMNS: [&str; 26] = [
    "period_end_date",
    "Year",
    "company_name",
    "currency",
    "reporting_unit",
    "revenue",
    "revenue_growth_yoy",
    "ebitda",
    "ebitda_margin",
    "ebit",
    "ebit_margin",
    "net_income",
    "net_income_growth_yoy",
    "net_margin",
    "assets",
    "assets_growth_yoy",
    "equity",
    "equity_growth_yoy",
    "roe",
    "liabilities",
    "cogs",
    "ocf",
    "depreciation_amortization",
    "shares_outstanding",
    "total_debt",
    "cash_and_equivalents",
];

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Date(NaiveDate),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Date(d) => write!(f, "{}", d),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AggregationWarning {
    /// Shares multiplied by [`SHARE_SCALE_FACTOR`]. A heuristic, not a proof.
    ShareScaleCorrected {
        company_name: String,
        period_end_date: NaiveDate,
        original: f64,
        corrected: f64,
    },
    /// No rate for this currency; values were left as reported.
    UnknownCurrency {
        company_name: String,
        currency: String,
    },
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShareScaleCorrected {
                company_name,
                period_end_date,
                original,
                corrected,
            } => write!(
                f,
                "{} {}: shares_outstanding {} looks like thousands, corrected to {}",
                company_name, period_end_date, original, corrected
            ),
            Self::UnknownCurrency {
                company_name,
                currency,
            } => write!(
                f,
                "{}: no exchange rate for {}, values left unconverted",
                company_name, currency
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub period_end_date: NaiveDate,
    #[serde(rename = "Year")]
    pub year: i32,
    pub company_name: String,
    pub currency: String,
    pub reporting_unit: String,

    pub revenue: f64,
    pub cogs: f64,
    pub ebit: f64,
    pub net_income: f64,
    pub depreciation_amortization: f64,
    pub assets: f64,
    pub liabilities: f64,
    pub equity: f64,
    pub ocf: f64,
    pub shares_outstanding: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,

    pub ebitda: f64,
    pub net_margin: f64,
    pub ebit_margin: f64,
    pub ebitda_margin: f64,
    pub roe: f64,

    pub revenue_growth_yoy: Option<f64>,
    pub net_income_growth_yoy: Option<f64>,
    pub assets_growth_yoy: Option<f64>,
    pub equity_growth_yoy: Option<f64>,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn growth(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous)
    }
}

impl KpiRow {
    fn from_period(
        report: &CompanyReport,
        period: &FinancialPeriod,
        currency: &str,
        rate: f64,
    ) -> Self {
        let money = |value: f64| value * rate;

        let revenue = money(period.revenue());
        let ebit = money(period.ebit());
        let net_income = money(period.net_income());
        let depreciation_amortization = money(period.depreciation_amortization());
        let equity = money(period.equity());
        let ebitda = ebit + depreciation_amortization;

        Self {
            period_end_date: period.period_end_date(),
            year: period.period_end_date().year(),
            company_name: report.company_name().to_string(),
            currency: currency.to_string(),
            reporting_unit: report.reporting_unit().to_string(),
            revenue,
            cogs: money(period.cogs()),
            ebit,
            net_income,
            depreciation_amortization,
            assets: money(period.assets()),
            liabilities: money(period.liabilities()),
            equity,
            ocf: money(period.ocf()),
            shares_outstanding: period.shares_outstanding(),
            total_debt: period.total_debt().map(money),
            cash_and_equivalents: period.cash_and_equivalents().map(money),
            ebitda,
            net_margin: ratio(net_income, revenue),
            ebit_margin: ratio(ebit, revenue),
            ebitda_margin: ratio(ebitda, revenue),
            roe: ratio(net_income, equity),
            revenue_growth_yoy: None,
            net_income_growth_yoy: None,
            assets_growth_yoy: None,
            equity_growth_yoy: None,
        }
    }

    fn attach_growth(&mut self, older: &KpiRow) {
        self.revenue_growth_yoy = growth(self.revenue, older.revenue);
        self.net_income_growth_yoy = growth(self.net_income, older.net_income);
        self.assets_growth_yoy = growth(self.assets, older.assets);
        self.equity_growth_yoy = growth(self.equity, older.equity);
    }

    /// Value of a presentation column, `None` when absent for this row.
    pub fn cell(&self, column: &str) -> Option<Cell> {
        let number = |v: f64| Some(Cell::Number(v));
        match column {
            "period_end_date" => Some(Cell::Date(self.period_end_date)),
            "Year" => Some(Cell::Integer(self.year as i64)),
            "company_name" => Some(Cell::Text(self.company_name.clone())),
            "currency" => Some(Cell::Text(self.currency.clone())),
            "reporting_unit" => Some(Cell::Text(self.reporting_unit.clone())),
            "revenue" => number(self.revenue),
            "cogs" => number(self.cogs),
            "ebit" => number(self.ebit),
            "net_income" => number(self.net_income),
            "depreciation_amortization" => number(self.depreciation_amortization),
            "assets" => number(self.assets),
            "liabilities" => number(self.liabilities),
            "equity" => number(self.equity),
            "ocf" => number(self.ocf),
            "shares_outstanding" => self.shares_outstanding.map(Cell::Number),
            "total_debt" => self.total_debt.map(Cell::Number),
            "cash_and_equivalents" => self.cash_and_equivalents.map(Cell::Number),
            "ebitda" => number(self.ebitda),
            "net_margin" => number(self.net_margin),
            "ebit_margin" => number(self.ebit_margin),
            "ebitda_margin" => number(self.ebitda_margin),
            "roe" => number(self.roe),
            "revenue_growth_yoy" => self.revenue_growth_yoy.map(Cell::Number),
            "net_income_growth_yoy" => self.net_income_growth_yoy.map(Cell::Number),
            "assets_growth_yoy" => self.assets_growth_yoy.map(Cell::Number),
            "equity_growth_yoy" => self.equity_growth_yoy.map(Cell::Number),
            _ => None,
        }
    }
}

/// Aggregated historical rows, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiTable {
    pub rows: Vec<KpiRow>,
    pub warnings: Vec<AggregationWarning>,
}

fn present_columns<R>(rows: &[R], cell: impl Fn(&R, &str) -> Option<Cell>) -> Vec<&'static str> {
    PRESENTATION_COLUMNS
        .iter()
        .copied()
        .filter(|column| rows.iter().any(|row| cell(row, column).is_some()))
        .collect()
}

impl KpiTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn present_columns(&self) -> Vec<&'static str> {
        present_columns(&self.rows, KpiRow::cell)
    }

    /// `(Year, revenue)` pairs for the forecaster.
    pub fn revenue_history(&self) -> Vec<(i32, f64)> {
        self.rows.iter().map(|r| (r.year, r.revenue)).collect()
    }

    /// Appends forecast points, stamped with the company metadata of the first row.
    /// Points not tagged as forecast are ignored.
    pub fn enrich_with_forecast(&self, forecast: &[ForecastPoint]) -> Result<CombinedTable> {
        let first = self.rows.first().ok_or(ReportError::EmptyTable)?;

        let mut rows: Vec<CombinedRow> = self
            .rows
            .iter()
            .cloned()
            .map(CombinedRow::Historical)
            .collect();
        rows.extend(
            forecast
                .iter()
                .filter(|p| p.kind == SeriesKind::Forecast)
                .map(|p| {
                    CombinedRow::Forecast(ForecastRow {
                        year: p.year,
                        revenue: p.revenue,
                        company_name: first.company_name.clone(),
                        currency: first.currency.clone(),
                        reporting_unit: first.reporting_unit.clone(),
                    })
                }),
        );

        Ok(CombinedTable { rows })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    #[serde(rename = "Year")]
    pub year: i32,
    pub revenue: f64,
    pub company_name: String,
    pub currency: String,
    pub reporting_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CombinedRow {
    Historical(KpiRow),
    Forecast(ForecastRow),
}

impl CombinedRow {
    pub fn kind(&self) -> SeriesKind {
        match self {
            Self::Historical(_) => SeriesKind::Historical,
            Self::Forecast(_) => SeriesKind::Forecast,
        }
    }

    pub fn cell(&self, column: &str) -> Option<Cell> {
        match self {
            Self::Historical(row) => row.cell(column),
            Self::Forecast(row) => match column {
                "Year" => Some(Cell::Integer(row.year as i64)),
                "revenue" => Some(Cell::Number(row.revenue)),
                "company_name" => Some(Cell::Text(row.company_name.clone())),
                "currency" => Some(Cell::Text(row.currency.clone())),
                "reporting_unit" => Some(Cell::Text(row.reporting_unit.clone())),
                _ => None,
            },
        }
    }
}

/// Historical rows followed by forecast rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinedTable {
    pub rows: Vec<CombinedRow>,
}

impl CombinedTable {
    pub fn present_columns(&self) -> Vec<&'static str> {
        present_columns(&self.rows, CombinedRow::cell)
    }

    pub fn historical(&self) -> impl Iterator<Item = &KpiRow> {
        self.rows.iter().filter_map(|row| match row {
            CombinedRow::Historical(r) => Some(r),
            CombinedRow::Forecast(_) => None,
        })
    }

    pub fn forecast(&self) -> impl Iterator<Item = &ForecastRow> {
        self.rows.iter().filter_map(|row| match row {
            CombinedRow::Forecast(r) => Some(r),
            CombinedRow::Historical(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReportAggregator {
    target_currency: String,
    exchange_rates: BTreeMap<String, f64>,
    share_scale_correction: bool,
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new(&AggregationConfig::default())
    }
}

impl ReportAggregator {
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            target_currency: config.target_currency.trim().to_uppercase(),
            exchange_rates: config
                .exchange_rates
                .iter()
                .map(|(code, rate)| (code.trim().to_uppercase(), *rate))
                .collect(),
            share_scale_correction: config.share_scale_correction,
        }
    }

    pub fn target_currency(&self) -> &str {
        &self.target_currency
    }

    /// Multiplier from `currency` to the target currency. `None` for unknown codes.
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        let code = currency.trim().to_uppercase();
        if code == self.target_currency {
            return Some(1.0);
        }
        self.exchange_rates.get(&code).copied()
    }

    pub fn aggregate(&self, reports: &[CompanyReport]) -> KpiTable {
        let mut warnings = Vec::new();
        let mut rows = Vec::new();

        for report in reports {
            let rate = match self.rate_for(report.reporting_currency()) {
                Some(rate) => rate,
                None => {
                    let warning = AggregationWarning::UnknownCurrency {
                        company_name: report.company_name().to_string(),
                        currency: report.reporting_currency().to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    1.0
                }
            };

            for period in report.periods() {
                let mut row = KpiRow::from_period(report, period, &self.target_currency, rate);
                if self.share_scale_correction {
                    if let Some(warning) = correct_share_scale(&mut row) {
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                }
                rows.push(row);
            }
        }

        rows.sort_by(|a, b| {
            b.period_end_date
                .cmp(&a.period_end_date)
                .then_with(|| a.company_name.cmp(&b.company_name))
        });

        for i in 0..rows.len() {
            let older = rows[i + 1..]
                .iter()
                .find(|r| r.company_name == rows[i].company_name)
                .cloned();
            if let Some(older) = older {
                rows[i].attach_growth(&older);
            }
        }

        info!(
            "Aggregated {} periods from {} reports into {}",
            rows.len(),
            reports.len(),
            self.target_currency
        );
        KpiTable { rows, warnings }
    }
}

/// A share count under ten million next to revenue over five hundred million almost
/// always means the filing reported shares in thousands.
fn correct_share_scale(row: &mut KpiRow) -> Option<AggregationWarning> {
    let shares = row.shares_outstanding?;
    if shares < SHARE_SCALE_MAX_SHARES && row.revenue > SHARE_SCALE_MIN_REVENUE {
        let corrected = shares * SHARE_SCALE_FACTOR;
        row.shares_outstanding = Some(corrected);
        return Some(AggregationWarning::ShareScaleCorrected {
            company_name: row.company_name.clone(),
            period_end_date: row.period_end_date,
            original: shares,
            corrected,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PeriodInput;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn period(end: &str, revenue: f64) -> FinancialPeriod {
        FinancialPeriod::try_new(PeriodInput {
            period_end_date: date(end),
            revenue,
            cogs: 60.0,
            ebit: 30.0,
            net_income: 24.0,
            depreciation_amortization: Some(5.0),
            assets: 200.0,
            liabilities: 100.0,
            equity: 100.0,
            ocf: 35.0,
            shares_outstanding: Some(100.0),
            total_debt: Some(50.0),
            cash_and_equivalents: Some(20.0),
        })
        .unwrap()
    }

    fn report(name: &str, currency: &str, periods: Vec<FinancialPeriod>) -> CompanyReport {
        CompanyReport::new(name, currency, "thousands", periods)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_known_currency_scales_every_monetary_field() {
        let table = ReportAggregator::default().aggregate(&[report(
            "Euro Corp",
            "EUR",
            vec![period("2024-12-31", 100.0)],
        )]);

        let row = &table.rows[0];
        assert_eq!(row.currency, "PLN");
        assert_close(row.revenue, 430.0);
        assert_close(row.assets, 860.0);
        assert_close(row.cogs, 60.0 * 4.3);
        assert_close(row.depreciation_amortization, 5.0 * 4.3);
        assert_close(row.total_debt.unwrap(), 50.0 * 4.3);
        assert_close(row.cash_and_equivalents.unwrap(), 20.0 * 4.3);
        assert_eq!(row.shares_outstanding, Some(100.0));
        assert!(table.warnings.is_empty());
    }

    #[test]
    fn test_target_currency_is_left_unchanged() {
        let aggregator = ReportAggregator::default();
        let reports = [report("PLN Corp", "pln", vec![period("2023-12-31", 100.0)])];

        let first = aggregator.aggregate(&reports);
        let second = aggregator.aggregate(&reports);
        assert_eq!(first.rows[0].revenue, 100.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_currency_passes_through_with_warning() {
        let table = ReportAggregator::default().aggregate(&[report(
            "Swiss Corp",
            "CHF",
            vec![period("2024-12-31", 100.0)],
        )]);

        assert_eq!(table.rows[0].revenue, 100.0);
        assert_eq!(
            table.warnings,
            vec![AggregationWarning::UnknownCurrency {
                company_name: "Swiss Corp".to_string(),
                currency: "CHF".to_string(),
            }]
        );
    }

    #[test]
    fn test_mixed_currency_reports() {
        let table = ReportAggregator::default().aggregate(&[
            report("Euro Corp", "EUR", vec![period("2024-12-31", 100.0)]),
            report("PLN Corp", "PLN", vec![period("2023-12-31", 100.0)]),
        ]);

        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|r| r.currency == "PLN"));
        assert_eq!(table.rows[0].year, 2024);
        assert_close(table.rows[0].revenue, 430.0);
        assert_eq!(table.rows[1].year, 2023);
        assert_eq!(table.rows[1].revenue, 100.0);
        // Different companies never feed each other's growth.
        assert_eq!(table.rows[0].revenue_growth_yoy, None);
    }

    #[test]
    fn test_growth_attaches_to_newer_row() {
        let table = ReportAggregator::default().aggregate(&[report(
            "Test Corp",
            "PLN",
            vec![period("2020-12-31", 90.0), period("2021-12-31", 100.0)],
        )]);

        assert_eq!(table.rows[0].year, 2021);
        assert_close(table.rows[0].revenue_growth_yoy.unwrap(), 10.0 / 90.0);
        assert_close(table.rows[0].assets_growth_yoy.unwrap(), 0.0);
        assert_eq!(table.rows[1].revenue_growth_yoy, None);
    }

    #[test]
    fn test_growth_is_grouped_by_company() {
        let table = ReportAggregator::default().aggregate(&[
            report(
                "Alpha",
                "PLN",
                vec![period("2022-12-31", 120.0), period("2021-12-31", 100.0)],
            ),
            report("Beta", "PLN", vec![period("2022-06-30", 500.0)]),
        ]);

        let alpha_2022 = table
            .rows
            .iter()
            .find(|r| r.company_name == "Alpha" && r.year == 2022)
            .unwrap();
        assert_close(alpha_2022.revenue_growth_yoy.unwrap(), 0.2);

        let beta = table.rows.iter().find(|r| r.company_name == "Beta").unwrap();
        assert_eq!(beta.revenue_growth_yoy, None);
    }

    #[test]
    fn test_growth_against_zero_is_absent() {
        let table = ReportAggregator::default().aggregate(&[report(
            "Startup",
            "PLN",
            vec![period("2023-12-31", 50.0), period("2022-12-31", 0.0)],
        )]);
        assert_eq!(table.rows[0].revenue_growth_yoy, None);
    }

    #[test]
    fn test_zero_revenue_margins_are_zero() {
        let table = ReportAggregator::default().aggregate(&[report(
            "Startup",
            "PLN",
            vec![period("2023-12-31", 0.0)],
        )]);

        let row = &table.rows[0];
        assert_eq!(row.net_margin, 0.0);
        assert_eq!(row.ebit_margin, 0.0);
        assert_eq!(row.ebitda_margin, 0.0);
        assert_close(row.ebitda, 35.0);
        assert_close(row.roe, 0.24);
    }

    fn share_row(shares: f64, revenue: f64) -> KpiRow {
        let report = report("Big Corp", "PLN", vec![period("2024-12-31", revenue)]);
        let mut row = KpiRow::from_period(&report, &report.periods()[0], "PLN", 1.0);
        row.shares_outstanding = Some(shares);
        row
    }

    #[test]
    fn test_share_scale_heuristic_thresholds() {
        let mut row = share_row(9_999_999.0, 500_000_001.0);
        assert!(correct_share_scale(&mut row).is_some());
        assert_eq!(row.shares_outstanding, Some(9_999_999_000.0));

        let mut at_share_limit = share_row(10_000_000.0, 600_000_000.0);
        assert!(correct_share_scale(&mut at_share_limit).is_none());
        assert_eq!(at_share_limit.shares_outstanding, Some(10_000_000.0));

        let mut at_revenue_limit = share_row(5_000_000.0, 500_000_000.0);
        assert!(correct_share_scale(&mut at_revenue_limit).is_none());
    }

    #[test]
    fn test_share_scale_correction_can_be_disabled() {
        let big = FinancialPeriod::try_new(PeriodInput {
            period_end_date: date("2024-12-31"),
            revenue: 800_000_000.0,
            assets: 2_000.0,
            liabilities: 1_000.0,
            equity: 1_000.0,
            shares_outstanding: Some(2_000_000.0),
            ..Default::default()
        })
        .unwrap();
        let reports = [report("Big Corp", "PLN", vec![big])];

        let corrected = ReportAggregator::default().aggregate(&reports);
        assert_eq!(corrected.rows[0].shares_outstanding, Some(2_000_000_000.0));
        assert_eq!(corrected.warnings.len(), 1);

        let config = AggregationConfig {
            share_scale_correction: false,
            ..Default::default()
        };
        let untouched = ReportAggregator::new(&config).aggregate(&reports);
        assert_eq!(untouched.rows[0].shares_outstanding, Some(2_000_000.0));
        assert!(untouched.warnings.is_empty());
    }

    #[test]
    fn test_present_columns_follow_presentation_order() {
        let bare = FinancialPeriod::try_new(PeriodInput {
            period_end_date: date("2024-12-31"),
            revenue: 10.0,
            assets: 2.0,
            liabilities: 1.0,
            equity: 1.0,
            ..Default::default()
        })
        .unwrap();
        let table = ReportAggregator::default().aggregate(&[report("Bare", "PLN", vec![bare])]);

        let columns = table.present_columns();
        assert_eq!(&columns[..3], &["period_end_date", "Year", "company_name"]);
        assert!(!columns.contains(&"shares_outstanding"));
        assert!(!columns.contains(&"revenue_growth_yoy"));
        assert!(columns.contains(&"depreciation_amortization"));
    }

    #[test]
    fn test_forecast_rows_inherit_metadata() {
        let table = ReportAggregator::default().aggregate(&[report(
            "Euro Corp",
            "EUR",
            vec![period("2024-12-31", 100.0)],
        )]);
        let forecast = [
            ForecastPoint {
                year: 2024,
                revenue: 430.0,
                kind: SeriesKind::Historical,
            },
            ForecastPoint {
                year: 2025,
                revenue: 440.0,
                kind: SeriesKind::Forecast,
            },
        ];

        let combined = table.enrich_with_forecast(&forecast).unwrap();
        assert_eq!(combined.rows.len(), 2);
        assert_eq!(combined.rows[1].kind(), SeriesKind::Forecast);

        let row = combined.forecast().next().unwrap();
        assert_eq!(row.company_name, "Euro Corp");
        assert_eq!(row.currency, "PLN");
        assert_eq!(row.reporting_unit, "thousands");
        assert_eq!(combined.rows[1].cell("net_margin"), None);
        assert_eq!(combined.historical().count(), 1);
    }

    #[test]
    fn test_enriching_empty_table_fails() {
        let err = KpiTable::default().enrich_with_forecast(&[]).unwrap_err();
        assert!(matches!(err, ReportError::EmptyTable));
    }
}
