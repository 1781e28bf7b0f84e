// Core types for pdf-organize
use lopdf::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Printed page number taken from a page's text layer.
///
/// Labels are opaque: "3", "iv" and "" are all valid and compared as plain
/// strings, never coerced to numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Label {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Handle to one page of a loaded source document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Page {
    id: ObjectId,
    index: usize,
    number: u32,
}

impl Page {
    /// `number` is lopdf's 1-based page number, `index` the zero-based
    /// position in the source document.
    pub const fn new(id: ObjectId, index: usize, number: u32) -> Self {
        Self { id, index, number }
    }

    pub const fn id(&self) -> ObjectId {
        self.id
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn number(&self) -> u32 {
        self.number
    }
}

/// Label substituted for a page whose printed number cannot be read.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackLabel {
    /// `#<index>`: every unreadable page survives on its own.
    #[default]
    Index,
    /// Empty label: all unreadable pages collapse into the last one seen.
    Empty,
}

impl FallbackLabel {
    pub fn label_for(self, page: &Page) -> Label {
        match self {
            FallbackLabel::Index => Label::new(format!("#{}", page.index())),
            FallbackLabel::Empty => Label::default(),
        }
    }
}

/// Page-count summary for one organized file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeResult {
    pub file_name: String,
    pub original_pages: usize,
    pub new_pages: usize,
    /// Pages that were keyed by a fallback label.
    pub fallback_pages: usize,
}

impl OrganizeResult {
    /// `(original - new) / original * 100`; an empty source counts as 0%.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_pages == 0 {
            return 0.0;
        }
        let removed = self.original_pages.saturating_sub(self.new_pages);
        removed as f64 / self.original_pages as f64 * 100.0
    }

    pub fn summary_line(&self) -> String {
        format!(
            "✓ {}: {} -> {} pages (↓ {:.2}%)",
            self.file_name,
            self.original_pages,
            self.new_pages,
            self.reduction_percent()
        )
    }
}
