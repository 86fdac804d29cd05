//! Documents stored in a vector collection.
//!
//! A [`Document`] pairs a stable string id with its embedding, the abstract
//! text, and a [`DocumentMetadata`] block used only for display. Metadata never
//! takes part in ranking.
//!
//! # Examples
//!
//! ```
//! use arxiv_atlas::document::{Document, DocumentMetadata};
//! use arxiv_atlas::vector::Vector;
//!
//! let mut metadata = DocumentMetadata::default();
//! metadata.title = "Attention Is All You Need".to_string();
//! metadata.year = 2017;
//!
//! let doc = Document::new("1706.03762", Vector::new(vec![0.6, 0.8]))
//!     .with_content("The dominant sequence transduction models ...")
//!     .with_metadata(metadata);
//!
//! assert_eq!(doc.metadata.doi, "-");
//! ```

pub mod jsonl;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// Placeholder used for absent string metadata.
pub const MISSING_FIELD: &str = "-";

fn missing_field() -> String {
    MISSING_FIELD.to_string()
}

/// Display metadata carried alongside a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Paper title.
    #[serde(default)]
    pub title: String,
    /// Author list, `;`-separated.
    #[serde(default)]
    pub authors: String,
    /// All categories, `;`-separated.
    #[serde(default)]
    pub categories: String,
    /// Primary category.
    #[serde(default)]
    pub main_category: String,
    /// Publication day of month.
    #[serde(default)]
    pub day: u32,
    /// Publication month.
    #[serde(default)]
    pub month: u32,
    /// Publication year.
    #[serde(default)]
    pub year: i32,
    /// DOI, or `-` when absent.
    #[serde(default = "missing_field")]
    pub doi: String,
    /// Journal reference, or `-` when absent.
    #[serde(default = "missing_field")]
    pub journal_ref: String,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            authors: String::new(),
            categories: String::new(),
            main_category: String::new(),
            day: 0,
            month: 0,
            year: 0,
            doi: missing_field(),
            journal_ref: missing_field(),
        }
    }
}

impl DocumentMetadata {
    /// Publication date, if the stored date parts form a valid calendar date.
    pub fn published(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Replace empty or sentinel values (`None`, `nan`, `N/A`) with `-`.
    pub fn normalize_missing(&mut self) {
        for field in [&mut self.doi, &mut self.journal_ref] {
            let trimmed = field.trim();
            if trimmed.is_empty() || matches!(trimmed, "None" | "nan" | "N/A") {
                *field = missing_field();
            }
        }
    }
}

/// A document with its embedding, text and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable unique identifier (e.g. an arXiv id).
    pub id: String,
    /// Document embedding.
    pub embedding: Vector,
    /// Abstract text.
    #[serde(default)]
    pub content: String,
    /// Display metadata.
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document with empty content and default metadata.
    pub fn new<S: Into<String>>(id: S, embedding: Vector) -> Self {
        Self {
            id: id.into(),
            embedding,
            content: String::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Set the abstract text.
    pub fn with_content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }

    /// Set the display metadata.
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
