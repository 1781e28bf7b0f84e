// PDF extraction module
pub mod label;
pub mod lopdf_helper;

pub use label::{extract_label, label_from_text, PAGE_NUMBER_DELIMITER};
pub use lopdf_helper::{build_output_document, load_pdf, pages, save_pdf_atomically};
