//! Document-to-text collaborators.
//!
//! The rest of the pipeline only needs "path in, text out" ([`DocumentParser`]) and
//! "page index in, page text out" ([`PageSource`]). Which parser handles a file is
//! decided by [`DocumentKind`].

use crate::error::{ReportError, Result};
use log::warn;
use std::path::Path;

/// Page separator used when page text is persisted to a single file.
pub const PAGE_BREAK: char = '\u{000C}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// XML, XHTML or HTML filings (e.g. ESEF reports).
    Xml,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "xml" | "xhtml" | "html" | "htm" => Ok(Self::Xml),
            _ => Err(ReportError::UnsupportedDocument(format!(
                "'.{}' ({})",
                ext,
                path.display()
            ))),
        }
    }

    /// Only paginated documents go through the page filter.
    pub fn is_paginated(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

pub trait DocumentParser {
    fn parse(&self, path: &Path) -> Result<String>;
}

/// Returns the parser for `kind`, or an unsupported-document error when the
/// matching Cargo feature is disabled.
pub fn parser_for(kind: DocumentKind) -> Result<Box<dyn DocumentParser>> {
    match kind {
        #[cfg(feature = "pdf")]
        DocumentKind::Pdf => Ok(Box::new(PdfTextParser)),
        #[cfg(feature = "xml")]
        DocumentKind::Xml => Ok(Box::new(MarkupTextParser)),
        #[allow(unreachable_patterns)]
        other => Err(ReportError::UnsupportedDocument(format!(
            "{:?} support is not compiled in",
            other
        ))),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ReportError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }
    Ok(())
}

#[cfg(feature = "pdf")]
pub struct PdfTextParser;

#[cfg(feature = "pdf")]
impl DocumentParser for PdfTextParser {
    fn parse(&self, path: &Path) -> Result<String> {
        let pages = TextPages::from_pdf(path)?;
        Ok(pages.into_text())
    }
}

/// A loaded PDF whose pages are rendered to text on demand. A page that fails to
/// render fails alone.
#[cfg(feature = "pdf")]
pub struct PdfPages {
    doc: pdf_extract::Document,
    page_numbers: Vec<u32>,
}

#[cfg(feature = "pdf")]
impl PdfPages {
    pub fn open(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        let parse_error = |e: pdf_extract::Error| {
            ReportError::DocumentParse(format!("{}: {}", path.display(), e))
        };

        let mut doc = pdf_extract::Document::load(path).map_err(parse_error)?;
        if doc.is_encrypted() {
            doc.decrypt("").map_err(parse_error)?;
        }
        let page_numbers = doc.get_pages().keys().copied().collect();
        Ok(Self { doc, page_numbers })
    }
}

#[cfg(feature = "pdf")]
impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let number = *self.page_numbers.get(index).ok_or_else(|| {
            ReportError::DocumentParse(format!(
                "page {} out of range ({} pages)",
                index + 1,
                self.page_numbers.len()
            ))
        })?;

        let mut text = String::new();
        {
            let mut output = pdf_extract::PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(&self.doc, &mut output, number)
                .map_err(|e| ReportError::DocumentParse(format!("page {}: {}", number, e)))?;
        }
        Ok(text)
    }
}

#[cfg(feature = "xml")]
pub struct MarkupTextParser;

#[cfg(feature = "xml")]
impl MarkupTextParser {
    const SKIPPED_ELEMENTS: [&'static str; 4] = ["head", "script", "style", "title"];

    /// Visible text of an XML/XHTML document, one line per text node.
    pub fn extract_text(&self, markup: &str) -> Result<String> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(markup, options)
            .map_err(|e| ReportError::DocumentParse(e.to_string()))?;

        let lines: Vec<String> = doc
            .descendants()
            .filter(|node| node.is_text())
            .filter(|node| {
                !node.ancestors().any(|a| {
                    a.is_element()
                        && Self::SKIPPED_ELEMENTS
                            .iter()
                            .any(|skipped| *skipped == a.tag_name().name())
                })
            })
            .filter_map(|node| node.text())
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect();

        Ok(lines.join("\n"))
    }
}

#[cfg(feature = "xml")]
impl DocumentParser for MarkupTextParser {
    fn parse(&self, path: &Path) -> Result<String> {
        ensure_exists(path)?;
        let markup = std::fs::read_to_string(path)?;
        self.extract_text(&markup)
    }
}

/// Per-page text access used by the page filter.
pub trait PageSource {
    fn page_count(&self) -> usize;
    fn page_text(&self, index: usize) -> Result<String>;
}

/// A document already rendered to text, one string per page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPages {
    pages: Vec<String>,
}

impl TextPages {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Renders every page of `source`. Unreadable pages are logged and kept empty so
    /// page indices stay aligned.
    pub fn from_source<S: PageSource + ?Sized>(source: &S) -> Self {
        Self::new(
            (0..source.page_count())
                .map(|index| {
                    source.page_text(index).unwrap_or_else(|err| {
                        warn!("Skipping unreadable page {}: {}", index + 1, err);
                        String::new()
                    })
                })
                .collect(),
        )
    }

    /// Splits text on form feeds, as written by the page filter.
    pub fn from_paginated_text(text: &str) -> Self {
        Self::new(text.split(PAGE_BREAK).map(|p| p.to_string()).collect())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        Ok(Self::from_paginated_text(&std::fs::read_to_string(path)?))
    }

    #[cfg(feature = "pdf")]
    pub fn from_pdf(path: &Path) -> Result<Self> {
        Ok(Self::from_source(&PdfPages::open(path)?))
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Keeps the listed pages in their original order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self::new(
            indices
                .iter()
                .filter_map(|&i| self.pages.get(i).cloned())
                .collect(),
        )
    }

    /// Joins pages back with form feeds so the result can be re-paginated.
    pub fn to_paginated_text(&self) -> String {
        self.pages.join(&PAGE_BREAK.to_string())
    }

    pub fn into_text(self) -> String {
        self.pages
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl PageSource for TextPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.pages.get(index).cloned().ok_or_else(|| {
            ReportError::DocumentParse(format!(
                "page {} out of range ({} pages)",
                index + 1,
                self.pages.len()
            ))
        })
    }
}
