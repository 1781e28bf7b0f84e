// File organizer: one PDF in, one deduplicated and reordered PDF out
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::OrganizeError;
use crate::pdf_extraction::{build_output_document, extract_label, load_pdf, pages, save_pdf_atomically};
use crate::progress::{ProgressReporter, Spinner};
use crate::reorder::reorder;
use crate::types::{FallbackLabel, OrganizeResult};

/// Per-file behaviour shared by every worker of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizeOptions {
    pub fallback: FallbackLabel,
    pub overwrite: bool,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            fallback: FallbackLabel::default(),
            overwrite: true,
        }
    }
}

/// Name shown on the progress line and used for the output file.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Output path for `file_path`: same file name, directly under `output_dir`.
pub fn output_path(file_path: &Path, output_dir: &Path) -> PathBuf {
    match file_path.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join(display_name(file_path)),
    }
}

/// Organize one file, reporting on `slot` of `reporter`.
///
/// Pages whose label cannot be read get `options.fallback` instead; only
/// open/parse and write failures abort the file.
pub fn organize<W: Write>(
    file_path: &Path,
    output_dir: &Path,
    slot: usize,
    reporter: &ProgressReporter<W>,
    options: &OrganizeOptions,
) -> Result<OrganizeResult, OrganizeError> {
    let file_name = display_name(file_path);
    info!("organizing {}", file_path.display());

    let document = load_pdf(file_path)?;
    let source_pages = pages(&document);
    let total = source_pages.len();

    let mut spinner = Spinner::new();
    let mut fallback_pages = 0;
    let mut labelled = Vec::with_capacity(total);
    for page in source_pages {
        let label = match extract_label(&document, &page) {
            Ok(label) => label,
            Err(e) => {
                debug!(
                    "{}: page {} has no printed number ({}), using fallback",
                    file_name,
                    page.index() + 1,
                    e
                );
                fallback_pages += 1;
                options.fallback.label_for(&page)
            }
        };
        labelled.push((label, page));

        let glyph = spinner.next().unwrap_or(' ');
        reporter.log(slot, &format!("{} {}: {}/{}", glyph, file_name, page.index() + 1, total));
    }

    let keep = reorder(labelled);
    let new_pages = keep.len();

    let mut output = build_output_document(document, &keep).map_err(|source| {
        OrganizeError::PageTree {
            path: file_path.to_path_buf(),
            source,
        }
    })?;
    let destination = output_path(file_path, output_dir);
    save_pdf_atomically(&mut output, &destination, options.overwrite)?;

    let result = OrganizeResult {
        file_name,
        original_pages: total,
        new_pages,
        fallback_pages,
    };
    info!(
        "{} -> {}: {} -> {} pages ({} fallback labels)",
        file_path.display(),
        destination.display(),
        result.original_pages,
        result.new_pages,
        result.fallback_pages
    );
    reporter.log(slot, &result.summary_line());
    Ok(result)
}
