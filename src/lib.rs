//! # Financial Report Pipeline
//!
//! Turns unstructured annual reports (PDF or XML/XHTML filings) into a validated,
//! currency-normalized, multi-period KPI table with a bounded revenue forecast.
//!
//! ## Stages
//!
//! - **Page filter**: scores every page of a PDF against weighted keywords and keeps
//!   only the primary statements. Finding nothing falls back to the full document.
//! - **Extraction**: one schema-constrained language-model call with retry/backoff and
//!   JSON recovery. Incomplete periods are dropped.
//! - **Validation**: [`FinancialPeriod`] cannot be built unless
//!   `assets ≈ liabilities + equity`.
//! - **Aggregation**: currency conversion, share-scale check, margins, returns and
//!   year-over-year growth per company.
//! - **Forecast**: a least-squares revenue trend floored at 30% of the last year.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_report_pipeline::*;
//! use std::path::Path;
//!
//! let pipeline = ReportPipeline::from_env(PipelineConfig::default())?;
//! let report = pipeline.process_document(Path::new("annual_report_2024.pdf"), None).await?;
//!
//! let analysis = pipeline.analyze(&[report])?;
//! CsvSink.write(&analysis.combined, &ValuationAssumptions::default(), Path::new("out.csv"))?;
//! ```

pub mod accounting;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod ingestion;
pub mod llm;
pub mod schema;
pub mod sink;

pub use accounting::{verify_accounting_equation, VerificationResult};
pub use aggregator::{
    AggregationWarning, Cell, CombinedRow, CombinedTable, ForecastRow, KpiRow, KpiTable,
    ReportAggregator,
};
pub use config::*;
pub use error::{ErrorKind, ReportError, Result};
pub use filter::{FilterReport, PageRelevanceFilter};
pub use forecast::{forecast_with_history, ForecastPoint, RevenueForecaster, SeriesKind};
pub use ingestion::*;
pub use llm::*;
pub use schema::*;
pub use sink::{CsvSink, TableSink, ValuationAssumptions};

#[cfg(feature = "pdf")]
pub use filter::filter_financial_pages;

use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::Sender;

/// Result of [`ReportPipeline::analyze`].
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: KpiTable,
    pub forecast: Vec<ForecastPoint>,
    pub cagr: f64,
    pub combined: CombinedTable,
}

/// Runs documents through filter, parse and extraction, and reports through
/// aggregation and forecasting. Holds no per-document state, so one pipeline can
/// process any number of documents in sequence.
pub struct ReportPipeline<M> {
    config: PipelineConfig,
    extractor: FinancialExtractor<M>,
    work_dir: Option<PathBuf>,
}

#[cfg(feature = "http")]
impl ReportPipeline<ChatClient> {
    /// Builds the HTTP client for `config.extraction.model` from environment credentials.
    pub fn from_env(config: PipelineConfig) -> Result<Self> {
        let client = ChatClient::for_model(&config.extraction.model, &Credentials::from_env())?;
        Self::new(client, config)
    }
}

impl<M: LanguageModel> ReportPipeline<M> {
    pub fn new(model: M, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let extractor = FinancialExtractor::from_config(model, &config.extraction)?;
        Ok(Self {
            config,
            extractor,
            work_dir: None,
        })
    }

    /// Directory for filtered page text. Defaults to the input document's directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractor(&self) -> &FinancialExtractor<M> {
        &self.extractor
    }

    /// Where the filtered page text for `input` is written.
    pub fn filtered_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let dir = self
            .work_dir
            .clone()
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        dir.join(format!("{}_filtered.txt", stem))
    }

    /// Text handed to extraction: the kept pages of a filtered PDF, or the whole
    /// document when filtering is disabled, not applicable or found nothing.
    pub fn load_text(&self, path: &Path) -> Result<String> {
        let kind = DocumentKind::from_path(path)?;

        if kind.is_paginated() && self.config.filter.enabled {
            if let Some(text) = self.filtered_text(path)? {
                return Ok(text);
            }
        }

        parser_for(kind)?.parse(path)
    }

    /// Any failure of the filter stage itself falls back to the full document. Only a
    /// PDF that cannot be opened at all is an error.
    #[cfg(feature = "pdf")]
    fn filtered_text(&self, path: &Path) -> Result<Option<String>> {
        let output = self.filtered_path(path);
        let pdf = PdfPages::open(path)?;

        let filter = PageRelevanceFilter::new(self.config.filter.threshold);
        let filtered = filter.filter_to_file(&pdf, &output).and_then(|kept| {
            if kept {
                TextPages::from_file(&output).map(|pages| Some(pages.into_text()))
            } else {
                Ok(None)
            }
        });

        match filtered {
            Ok(Some(text)) => return Ok(Some(text)),
            Ok(None) => warn!(
                "No financial pages found in {}; using the full document",
                path.display()
            ),
            Err(err) => warn!(
                "Page filter failed for {}: {}. Using the full document",
                path.display(),
                err
            ),
        }
        Ok(Some(TextPages::from_source(&pdf).into_text()))
    }

    #[cfg(not(feature = "pdf"))]
    fn filtered_text(&self, _path: &Path) -> Result<Option<String>> {
        Ok(None)
    }

    pub async fn process_document(
        &self,
        path: &Path,
        progress: Option<Sender<ExtractionEvent>>,
    ) -> Result<CompanyReport> {
        info!("Processing {}", path.display());
        let text = self.load_text(path)?;
        self.extractor.extract(&text, progress).await
    }

    /// Processes documents one after another. A failed document does not stop the
    /// rest; each result is returned next to its path.
    pub async fn process_batch(
        &self,
        paths: &[PathBuf],
    ) -> Vec<(PathBuf, Result<CompanyReport>)> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.process_document(path, None).await;
            if let Err(err) = &result {
                warn!("{} failed ({:?}): {}", path.display(), err.kind(), err);
            }
            results.push((path.clone(), result));
        }
        results
    }

    pub fn analyze(&self, reports: &[CompanyReport]) -> Result<Analysis> {
        analyze_reports(&self.config, reports)
    }
}

/// Aggregates `reports`, fits the forecaster on the resulting revenue history and
/// appends the forecast. An empty result is an error.
pub fn analyze_reports(config: &PipelineConfig, reports: &[CompanyReport]) -> Result<Analysis> {
    let table = ReportAggregator::new(&config.aggregation).aggregate(reports);
    if table.is_empty() {
        return Err(ReportError::EmptyTable);
    }

    let mut forecaster = RevenueForecaster::from_config(&config.forecast);
    forecaster.fit(&table.revenue_history());
    let forecast = forecaster.predict();
    let combined = table.enrich_with_forecast(&forecast)?;

    info!(
        "Analysis ready: {} historical rows, {} forecast years, CAGR {:.2}%",
        table.rows.len(),
        forecast.len(),
        forecaster.cagr() * 100.0
    );

    Ok(Analysis {
        cagr: forecaster.cagr(),
        table,
        forecast,
        combined,
    })
}
