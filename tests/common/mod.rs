// Shared fixtures: small text-layer PDFs built with lopdf
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Write a PDF whose page `i` shows the lines of `pages[i]` top to bottom,
/// each line in its own text object.
pub fn write_pdf(path: &Path, pages: &[Vec<String>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![72.into(), (760 - 20 * i as i64).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// A scanned page: a body line naming the scan plus the "N/total" footer.
pub fn scanned_page(scan: &str, footer: &str) -> Vec<String> {
    vec![format!("scan {scan}"), footer.to_string()]
}

/// Write a PDF of scanned pages given as (scan id, footer) pairs.
pub fn write_scans(path: &Path, scans: &[(&str, &str)]) {
    let pages: Vec<Vec<String>> = scans
        .iter()
        .map(|(scan, footer)| scanned_page(scan, footer))
        .collect();
    write_pdf(path, &pages);
}

/// Write a PDF of `count` distinct scans numbered `1/count` .. `count/count`.
pub fn write_numbered(path: &Path, count: usize) {
    let pages: Vec<Vec<String>> = (1..=count)
        .map(|n| scanned_page(&n.to_string(), &format!("{n}/{count}")))
        .collect();
    write_pdf(path, &pages);
}

/// Text of every page of the PDF at `path`, in page order.
pub fn page_texts(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .keys()
        .map(|number| doc.extract_text(&[*number]).unwrap())
        .collect()
}

/// The "scan <id>" body line of every page, in page order.
pub fn scan_ids(path: &Path) -> Vec<String> {
    page_texts(path)
        .iter()
        .map(|text| {
            text.lines()
                .map(str::trim)
                .find_map(|line| line.strip_prefix("scan "))
                .unwrap_or("")
                .to_string()
        })
        .collect()
}

/// Clonable in-memory terminal sink.
#[derive(Clone, Default)]
pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
