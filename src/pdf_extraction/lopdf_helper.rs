// lopdf helper - Pure Rust PDF operations
use lopdf::{Document, Object, ObjectId};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::Builder;

use crate::error::OrganizeError;
use crate::types::Page;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic /Parent chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Load a PDF document using lopdf
pub fn load_pdf(path: &Path) -> Result<Document, OrganizeError> {
    let file = File::open(path).map_err(|source| OrganizeError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    Document::load_from(BufReader::new(file)).map_err(|source| OrganizeError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pages of `document` in their original order.
pub fn pages(document: &Document) -> Vec<Page> {
    document
        .get_pages()
        .into_iter()
        .enumerate()
        .map(|(index, (number, id))| Page::new(id, index, number))
        .collect()
}

/// Turn `document` into one holding exactly `keep`, in that order.
///
/// The page tree is flattened under the catalog's root /Pages node.
/// Attributes a kept page inherited from an intermediate node are copied onto
/// the page first, so dropping those nodes does not change how it renders.
pub fn build_output_document(mut document: Document, keep: &[Page]) -> lopdf::Result<Document> {
    let root_pages = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .and_then(|catalog| document.get_object(catalog))
        .and_then(Object::as_dict)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)?;

    let inherited = keep
        .iter()
        .map(|page| Ok((page.id(), inherited_attributes(&document, page.id())?)))
        .collect::<lopdf::Result<Vec<_>>>()?;

    for (page_id, attributes) in inherited {
        let page = document.get_object_mut(page_id)?.as_dict_mut()?;
        for (key, value) in attributes {
            page.set(key, value);
        }
        page.set("Parent", Object::Reference(root_pages));
    }

    let kids: Vec<Object> = keep.iter().map(|page| Object::Reference(page.id())).collect();
    let root = document.get_object_mut(root_pages)?.as_dict_mut()?;
    root.set("Count", Object::Integer(kids.len() as i64));
    root.set("Kids", Object::Array(kids));
    root.remove(b"Parent");

    document.prune_objects();
    Ok(document)
}

/// Inheritable attributes of `page_id` that live on an ancestor node.
fn inherited_attributes(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<(Vec<u8>, Object)>> {
    let page = document.get_object(page_id)?.as_dict()?;
    let mut found = Vec::new();

    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;
        while let Some(node_id) = parent {
            if depth == MAX_TREE_DEPTH {
                break;
            }
            let node = document.get_object(node_id)?.as_dict()?;
            if let Ok(value) = node.get(key) {
                found.push((key.to_vec(), value.clone()));
                break;
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    Ok(found)
}

/// Save `document` to `destination` through a temp file in the same
/// directory, renamed into place only once fully written.
pub fn save_pdf_atomically(
    document: &mut Document,
    destination: &Path,
    overwrite: bool,
) -> Result<(), OrganizeError> {
    let write_error = |source: std::io::Error| OrganizeError::Write {
        path: destination.to_path_buf(),
        source,
    };

    if !overwrite && destination.exists() {
        return Err(OrganizeError::AlreadyExists(destination.to_path_buf()));
    }

    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = Builder::new()
        .prefix(".pdf-organize-")
        .suffix(".part")
        .tempfile_in(directory)
        .map_err(write_error)?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        document.save_to(&mut writer).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
    }
    temp.as_file().sync_all().map_err(write_error)?;

    if overwrite {
        temp.persist(destination).map_err(|e| write_error(e.error))?;
    } else {
        temp.persist_noclobber(destination).map_err(|e| write_error(e.error))?;
    }
    Ok(())
}
