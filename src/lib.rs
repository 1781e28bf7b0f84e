//! Deduplicate and reorder the pages of scanned PDFs.
//!
//! Every page is keyed by the printed `N/total` number on its last text line.
//! For each number only the last scanned page is kept, placed where that
//! number was first seen. All PDFs of a directory are processed concurrently
//! with one live progress line per file.

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod organizer;
pub mod pdf_extraction;
pub mod progress;
pub mod reorder;
pub mod types;

pub use batch::{discover_files, BatchCoordinator, BatchOptions, BatchReport, FileOutcome};
pub use error::{BatchError, ConfigError, ExtractionError, OrganizeError};
pub use organizer::{organize, OrganizeOptions};
pub use progress::{CursorGuard, ProgressReporter, Spinner};
pub use reorder::{reorder, PageTable};
pub use types::{FallbackLabel, Label, OrganizeResult, Page};
