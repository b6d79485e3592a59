//! Page text for a class list, from a Banner PDF or a plain-text dump.
//!
//! Text dumps separate pages with form feeds (`\x0C`). A PDF page whose
//! text cannot be extracted becomes an empty page so the rest of the roster
//! is still read.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ClasslistError, Result};

const PAGE_BREAK: char = '\x0C';

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub pages: Vec<String>,
}

impl LoadedDocument {
    pub fn first_page(&self) -> &str {
        self.pages.first().map(String::as_str).unwrap_or_default()
    }
}

/// `None` means the user gave no document; nothing else may happen.
pub fn resolve_input(input: Option<&Path>) -> Result<PathBuf> {
    let path = input
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ClasslistError::NoInput)?;
    if !path.is_file() {
        return Err(ClasslistError::MissingInput(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

pub fn load(path: &Path) -> Result<LoadedDocument> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let pages = match ext.as_deref() {
        Some("pdf") => pdf_pages(path)?,
        Some("txt") => text_pages(&std::fs::read_to_string(path)?),
        _ => return Err(ClasslistError::UnsupportedInput(path.to_path_buf())),
    };

    info!("Loaded {} pages from {:?}", pages.len(), path);
    Ok(LoadedDocument {
        path: path.to_path_buf(),
        pages,
    })
}

pub fn text_pages(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split(PAGE_BREAK)
        .map(|p| p.to_string())
        .collect()
}

fn pdf_pages(path: &Path) -> Result<Vec<String>> {
    // The document is dropped when this returns, on success or error.
    let doc = lopdf::Document::load(path).map_err(|e| ClasslistError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
    debug!("PDF {:?} has {} pages", path, page_numbers.len());

    let pages = page_numbers
        .into_iter()
        .map(|n| page_text(n, path, doc.extract_text(&[n])))
        .collect();
    Ok(pages)
}

/// A page that fails to extract is read as empty.
fn page_text<E: std::fmt::Display>(
    n: u32,
    path: &Path,
    extracted: std::result::Result<String, E>,
) -> String {
    match extracted {
        Ok(text) => text,
        Err(e) => {
            warn!("page {} of {:?}: text extraction failed ({}), using empty page", n, path, e);
            String::new()
        }
    }
}

// ── Tests ──
