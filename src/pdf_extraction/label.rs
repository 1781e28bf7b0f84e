// Printed page-number extraction
//
// Scanned documents carry their page number as an "N/total" footer, which the
// text layer emits as the last line of the page. The label is whatever sits
// before the first '/' on that line. This is a heuristic for that footer
// convention only: pages without a text layer (no OCR is done here) or with a
// different footer fail with ExtractionError and the caller picks a fallback.
use lopdf::Document;

use crate::error::ExtractionError;
use crate::types::{Label, Page};

pub const PAGE_NUMBER_DELIMITER: char = '/';

/// Read the label of `page` from its text layer.
pub fn extract_label(document: &Document, page: &Page) -> Result<Label, ExtractionError> {
    let text = document.extract_text(&[page.number()])?;
    label_from_text(&text)
}

/// Label from already extracted page text.
pub fn label_from_text(text: &str) -> Result<Label, ExtractionError> {
    let line = text
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .ok_or(ExtractionError::NoText)?;

    let (number, _total) = line.split_once(PAGE_NUMBER_DELIMITER).ok_or_else(|| {
        ExtractionError::MissingDelimiter {
            line: line.to_string(),
        }
    })?;

    Ok(Label::new(number.trim()))
}
