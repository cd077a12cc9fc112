//! Keyword scoring of report pages.
//!
//! Annual reports run to hundreds of pages while the primary statements fill a
//! handful. Each page gets a weighted keyword score and only pages scoring above the
//! threshold are passed on to extraction.

use crate::config::DEFAULT_FILTER_THRESHOLD;
use crate::error::Result;
use crate::ingestion::PageSource;
use log::{debug, info, warn};
use std::path::Path;

/// Phrase weights, matched case-insensitively as substrings. Each phrase counts once
/// per page. Statement headers outweigh the generic line items that merely confirm a
/// financial page. Table-of-contents pages mention every statement, so they carry a
/// penalty large enough to sink them.
pub const DEFAULT_KEYWORDS: &[(&str, i32)] = &[
    // Consolidated statements
    ("skonsolidowane sprawozdanie", 50),
    ("consolidated financial statements", 50),
    // Statement headers
    ("rachunek zysków i strat", 100),
    ("profit or loss", 100),
    ("profit and loss", 100),
    ("income statement", 100),
    ("sytuacji finansowej", 100),
    ("financial position", 100),
    ("balance sheet", 100),
    ("przepływy pieniężne", 100),
    ("przepływów pieniężnych", 100),
    ("cash flows", 100),
    // Line items
    ("aktywa", 20),
    ("pasywa", 20),
    ("przychody ze sprzedaży", 20),
    ("zysk netto", 20),
    ("total assets", 20),
    ("total equity", 20),
    ("revenue", 20),
    ("net profit", 20),
    // Noise
    ("spis treści", -500),
    ("table of contents", -500),
    ("strona", -5),
    ("page", -5),
];

#[derive(Debug, Clone, PartialEq)]
pub enum PageStatus {
    Scored,
    /// No extractable text (scanned image, blank separator page).
    Empty,
    /// Text extraction failed for this page; scanning continued.
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageScore {
    pub index: usize,
    pub score: i32,
    pub kept: bool,
    pub status: PageStatus,
}

/// Scores for every page of one document, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterReport {
    pub pages: Vec<PageScore>,
}

impl FilterReport {
    /// Indices of kept pages, ascending.
    pub fn kept_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.kept)
            .map(|p| p.index)
            .collect()
    }

    pub fn has_matches(&self) -> bool {
        self.pages.iter().any(|p| p.kept)
    }
}

#[derive(Debug, Clone)]
pub struct PageRelevanceFilter {
    threshold: i32,
    keywords: Vec<(String, i32)>,
}

impl Default for PageRelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_THRESHOLD)
    }
}

impl PageRelevanceFilter {
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold,
            keywords: DEFAULT_KEYWORDS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<(String, i32)>) -> Self {
        self.keywords = keywords
            .into_iter()
            .map(|(k, w)| (k.to_lowercase(), w))
            .collect();
        self
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn score_text(&self, text: &str) -> i32 {
        let folded = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|(keyword, _)| folded.contains(keyword.as_str()))
            .map(|(_, weight)| weight)
            .sum()
    }

    /// Scores every page. A page is kept when its score is strictly greater than the
    /// threshold. Empty and unreadable pages score zero and are never kept.
    pub fn scan<S: PageSource + ?Sized>(&self, source: &S) -> FilterReport {
        let pages = (0..source.page_count())
            .map(|index| match source.page_text(index) {
                Ok(text) if text.trim().is_empty() => PageScore {
                    index,
                    score: 0,
                    kept: false,
                    status: PageStatus::Empty,
                },
                Ok(text) => {
                    let score = self.score_text(&text);
                    let kept = score > self.threshold;
                    debug!(
                        "Page {}: score {}{}",
                        index + 1,
                        score,
                        if kept { " (kept)" } else { "" }
                    );
                    PageScore {
                        index,
                        score,
                        kept,
                        status: PageStatus::Scored,
                    }
                }
                Err(err) => {
                    warn!("Error reading page {}: {}", index + 1, err);
                    PageScore {
                        index,
                        score: 0,
                        kept: false,
                        status: PageStatus::Unreadable(err.to_string()),
                    }
                }
            })
            .collect();

        FilterReport { pages }
    }

    /// Scans `source` and writes the kept pages, form-feed separated and in original
    /// order, to `output`. Returns `false` and writes nothing when no page qualified;
    /// callers should then fall back to the full document.
    pub fn filter_to_file<S: PageSource + ?Sized>(
        &self,
        source: &S,
        output: &Path,
    ) -> Result<bool> {
        let report = self.scan(source);
        let kept = report.kept_pages();

        if kept.is_empty() {
            warn!(
                "No pages scored above {} out of {}; keeping the full document",
                self.threshold,
                source.page_count()
            );
            return Ok(false);
        }

        let mut pages = Vec::with_capacity(kept.len());
        for &index in &kept {
            pages.push(source.page_text(index)?);
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output, pages.join(&crate::ingestion::PAGE_BREAK.to_string()))?;

        info!(
            "Kept {} of {} pages: {:?}",
            kept.len(),
            source.page_count(),
            kept.iter().map(|i| i + 1).collect::<Vec<_>>()
        );
        Ok(true)
    }
}

/// Filters the PDF at `input` into `output`. A missing input is an I/O error; a
/// document with no qualifying page returns `Ok(false)`.
#[cfg(feature = "pdf")]
pub fn filter_financial_pages(input: &Path, output: &Path, threshold: i32) -> Result<bool> {
    let pages = crate::ingestion::PdfPages::open(input)?;
    info!(
        "Scanning {} pages of {}",
        pages.page_count(),
        input.display()
    );
    PageRelevanceFilter::new(threshold).filter_to_file(&pages, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::ingestion::TextPages;

    struct FlakySource {
        pages: Vec<Option<&'static str>>,
    }

    impl PageSource for FlakySource {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&self, index: usize) -> Result<String> {
            self.pages[index]
                .map(|p| p.to_string())
                .ok_or_else(|| ReportError::DocumentParse("corrupt content stream".to_string()))
        }
    }

    #[test]
    fn test_scores_are_case_insensitive_sums() {
        let filter = PageRelevanceFilter::default();
        assert_eq!(filter.score_text("RACHUNEK ZYSKÓW I STRAT\nZysk netto"), 120);
        assert_eq!(filter.score_text("Spis treści\nBalance sheet\nCash flows"), -300);
        assert_eq!(filter.score_text("Letter from the chairman"), 0);
    }

    #[test]
    fn test_statement_pages_are_kept_in_order() {
        let pages = TextPages::new(vec![
            "Spis treści: rachunek zysków i strat, przepływy pieniężne".to_string(),
            "Letter from the chairman".to_string(),
            "Skonsolidowany rachunek zysków i strat\nPrzychody ze sprzedaży 1000".to_string(),
            "Sprawozdanie z sytuacji finansowej\nAktywa razem\nPasywa razem".to_string(),
        ]);

        let report = PageRelevanceFilter::new(50).scan(&pages);
        assert_eq!(report.kept_pages(), vec![2, 3]);
        assert!(report.pages[0].score < 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let filter = PageRelevanceFilter::new(100);
        let pages = TextPages::new(vec!["Balance sheet".to_string()]);
        assert!(!filter.scan(&pages).has_matches());
        assert!(PageRelevanceFilter::new(99).scan(&pages).has_matches());
    }

    #[test]
    fn test_unreadable_and_empty_pages_do_not_stop_the_scan() {
        let source = FlakySource {
            pages: vec![None, Some("   "), Some("Statement of cash flows")],
        };

        let report = PageRelevanceFilter::default().scan(&source);
        assert!(matches!(report.pages[0].status, PageStatus::Unreadable(_)));
        assert_eq!(report.pages[1].status, PageStatus::Empty);
        assert_eq!(report.kept_pages(), vec![2]);
    }

    #[test]
    fn test_filter_to_file_writes_kept_pages() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("filtered").join("report.txt");
        let pages = TextPages::new(vec![
            "Income statement".to_string(),
            "Notes".to_string(),
            "Balance sheet".to_string(),
        ]);

        let kept = PageRelevanceFilter::default()
            .filter_to_file(&pages, &output)
            .unwrap();

        assert!(kept);
        let written = TextPages::from_file(&output).unwrap();
        assert_eq!(written.pages(), &["Income statement", "Balance sheet"]);
    }

    #[test]
    fn test_no_qualifying_pages_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.txt");
        let pages = TextPages::new(vec![
            "Table of contents: balance sheet, cash flows".to_string(),
            "Strona 2".to_string(),
        ]);

        let kept = PageRelevanceFilter::default()
            .filter_to_file(&pages, &output)
            .unwrap();

        assert!(!kept);
        assert!(!output.exists());
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_missing_pdf_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = filter_financial_pages(
            &dir.path().join("missing.pdf"),
            &dir.path().join("out.txt"),
            50,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::IoError(_)));
    }
}
