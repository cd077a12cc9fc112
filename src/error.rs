use chrono::NaiveDate;
use thiserror::Error;

/// Coarse classification used by callers to decide what to do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credentials, unsupported document type, bad configuration. Never retried.
    Configuration,
    /// Network failure, empty or malformed model response. Retried with backoff.
    Transient,
    /// The extracted figures are wrong. Retrying identical input yields identical output.
    DataQuality,
    /// Local filesystem or document decoding failure.
    Io,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Missing credentials for {family}: set {variable}")]
    MissingCredentials {
        family: &'static str,
        variable: &'static str,
    },

    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Language model API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Received empty response from language model")]
    EmptyResponse,

    #[error("Model response is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("Accounting equation violated on {date}: Assets ({assets}) != Liabilities ({liabilities}) + Equity ({equity}) (diff {difference} > tolerance {tolerance})")]
    AccountingIdentityViolation {
        date: NaiveDate,
        assets: f64,
        liabilities: f64,
        equity: f64,
        difference: f64,
        tolerance: f64,
    },

    #[error("Field '{field}' must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("Cannot enrich an empty table: no historical row to take metadata from")]
    EmptyTable,

    #[error("Document parsing failed: {0}")]
    DocumentParse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredentials { .. }
            | Self::UnsupportedDocument(_)
            | Self::InvalidConfig(_) => ErrorKind::Configuration,
            // Rejected credentials will not start working on the next attempt.
            Self::Api { status, .. } if matches!(*status, 401 | 403) => ErrorKind::Configuration,
            Self::Api { .. } | Self::Network(_) | Self::EmptyResponse | Self::MalformedJson(_) => {
                ErrorKind::Transient
            }
            Self::AccountingIdentityViolation { .. }
            | Self::NegativeValue { .. }
            | Self::EmptyTable => ErrorKind::DataQuality,
            Self::DocumentParse(_)
            | Self::SerializationError(_)
            | Self::CsvError(_)
            | Self::IoError(_) => ErrorKind::Io,
        }
    }

    /// Only transient service failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
