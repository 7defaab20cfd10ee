//! PDF manual loading
//!
//! Parses a PDF with lopdf, pulling out per-page text and the declared
//! outline (bookmark tree). Text extraction decodes content-stream text
//! operators with UTF-8, UTF-16BE, and Latin-1 fallback; the outline walk
//! follows the Catalog -> Outlines -> First/Next chains and resolves each
//! entry's destination to a one-based page number.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::error::CoreError;

/// One declared outline entry: nesting level (1-based), title, and the
/// one-based page the entry points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub level: u32,
    pub title: String,
    pub page: u32,
}

/// A loaded PDF manual: per-page text plus the declared outline.
#[derive(Debug)]
pub struct ManualDocument {
    doc: Document,
    /// One-based page number -> extracted text.
    page_texts: BTreeMap<u32, String>,
}

impl ManualDocument {
    /// Load a manual from a file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let doc = Document::load(path.as_ref())
            .map_err(|e| CoreError::DocumentLoad(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Load a manual from raw PDF bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        let doc =
            Document::load_mem(data).map_err(|e| CoreError::DocumentLoad(e.to_string()))?;
        Self::from_document(doc)
    }

    fn from_document(doc: Document) -> Result<Self, CoreError> {
        let mut page_texts = BTreeMap::new();

        for (&page_num, &page_id) in doc.get_pages().iter() {
            page_texts.insert(page_num, extract_page_text(&doc, page_id));
        }

        Ok(Self { doc, page_texts })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_texts.len()
    }

    /// Text of the given one-based page, if it exists.
    pub fn page_text(&self, page: u32) -> Option<&str> {
        self.page_texts.get(&page).map(String::as_str)
    }

    /// All pages in order as (one-based page number, text).
    pub fn pages(&self) -> impl Iterator<Item = (u32, &str)> {
        self.page_texts.iter().map(|(&n, t)| (n, t.as_str()))
    }

    /// The declared outline as ordered (level, title, page) entries.
    ///
    /// Malformed or missing outlines yield an empty list; entries whose
    /// destination cannot be resolved to a page are skipped.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();

        let Ok(catalog) = self.doc.catalog() else {
            return entries;
        };
        let Some(root) = catalog
            .get(b"Outlines")
            .ok()
            .and_then(|obj| self.resolve_dict(obj))
        else {
            return entries;
        };

        // Page object id -> one-based page number, for destination lookup
        let page_numbers: HashMap<ObjectId, u32> = self
            .doc
            .get_pages()
            .iter()
            .map(|(&num, &id)| (id, num))
            .collect();

        let mut seen = HashSet::new();
        if let Ok(first) = root.get(b"First") {
            self.walk_outline(first, 1, &page_numbers, &mut seen, &mut entries);
        }

        debug!(entries = entries.len(), "parsed document outline");
        entries
    }

    /// Walk an outline sibling chain, recursing into children.
    fn walk_outline(
        &self,
        node: &Object,
        level: u32,
        page_numbers: &HashMap<ObjectId, u32>,
        seen: &mut HashSet<ObjectId>,
        entries: &mut Vec<OutlineEntry>,
    ) {
        // Outline trees are shallow; the depth cap guards corrupt files
        if level > 32 {
            return;
        }

        let mut current = Some(node.clone());
        while let Some(obj) = current {
            // Cycle guard on reference chains
            if let Ok(id) = obj.as_reference() {
                if !seen.insert(id) {
                    return;
                }
            }

            let Some(dict) = self.resolve_dict(&obj) else {
                return;
            };

            let title = dict
                .get(b"Title")
                .ok()
                .and_then(|t| self.resolve_string(t));

            if let Some(title) = title {
                if let Some(page) = self.destination_page(dict, page_numbers) {
                    entries.push(OutlineEntry { level, title, page });
                }
            }

            if let Ok(first) = dict.get(b"First") {
                self.walk_outline(first, level + 1, page_numbers, seen, entries);
            }

            current = dict.get(b"Next").ok().cloned();
        }
    }

    /// Resolve an outline item's destination to a one-based page number.
    ///
    /// Handles direct `Dest` arrays and GoTo actions; named destinations
    /// are not resolved.
    fn destination_page(
        &self,
        item: &Dictionary,
        page_numbers: &HashMap<ObjectId, u32>,
    ) -> Option<u32> {
        let dest = item.get(b"Dest").ok().cloned().or_else(|| {
            let action = self.resolve_dict(item.get(b"A").ok()?)?;
            match action.get(b"S") {
                Ok(Object::Name(name)) if name == b"GoTo" => action.get(b"D").ok().cloned(),
                _ => None,
            }
        })?;

        let dest = self.resolve(&dest)?;
        let arr = dest.as_array().ok()?;
        let page_ref = arr.first()?.as_reference().ok()?;
        page_numbers.get(&page_ref).copied()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj)?.as_dict().ok()
    }

    fn resolve_string(&self, obj: &Object) -> Option<String> {
        match self.resolve(obj)? {
            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
            _ => None,
        }
    }
}

/// Extract the text of a single page from its content stream.
fn extract_page_text(doc: &Document, page_id: ObjectId) -> String {
    let mut text = String::new();

    let Ok(content) = doc.get_page_content(page_id) else {
        return text;
    };
    let Ok(operations) = lopdf::content::Content::decode(&content) else {
        return text;
    };

    for op in operations.operations {
        match op.operator.as_str() {
            // Text showing operators
            "Tj" | "TJ" | "'" | "\"" => {
                for operand in &op.operands {
                    if let Some(s) = text_from_operand(operand) {
                        text.push_str(&s);
                    }
                }
            }
            // Line positioning; keeps header tokens from gluing together
            "Td" | "TD" | "T*" => {
                if !text.ends_with(['\n', ' ']) && !text.is_empty() {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }

    text
}

fn text_from_operand(operand: &Object) -> Option<String> {
    match operand {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Array(arr) => {
            let mut text = String::new();
            for item in arr {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                    // Large negative adjustments usually mean word gaps
                    Object::Integer(n) if *n < -100 => text.push(' '),
                    _ => {}
                }
            }
            Some(text)
        }
        _ => None,
    }
}

/// Decode a PDF text string: UTF-8, then UTF-16BE (BOM-prefixed), then
/// Latin-1 as the last resort.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_pdf_string(b"ORG 1.1 Management"), "ORG 1.1 Management");
    }

    #[test]
    fn test_decode_utf16be() {
        // BOM + "Hi"
        let bytes = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_pdf_string(&bytes), "Hi");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xE9 is 'é' in Latin-1 and invalid standalone UTF-8
        assert_eq!(decode_pdf_string(&[b'c', 0xE9]), "c\u{e9}");
    }

    #[test]
    fn test_corrupt_document_is_load_error() {
        let err = ManualDocument::from_bytes(b"not a pdf").unwrap_err();
        assert!(matches!(err, CoreError::DocumentLoad(_)));
    }

    #[test]
    fn test_kerning_gap_becomes_space() {
        let arr = Object::Array(vec![
            Object::String(b"ORG".to_vec(), lopdf::StringFormat::Literal),
            Object::Integer(-250),
            Object::String(b"1.1".to_vec(), lopdf::StringFormat::Literal),
        ]);
        assert_eq!(text_from_operand(&arr).unwrap(), "ORG 1.1");
    }
}
