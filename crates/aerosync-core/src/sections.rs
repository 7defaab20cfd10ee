//! Section extraction
//!
//! Builds a title -> section mapping for a manual from two sources:
//! the document's declared outline, and an in-page scan for numbered
//! header tokens ("ORG 1.1", "ORG 2.3.4", ...). Outline entries are
//! seeded first and win on title collision.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::document::{ManualDocument, OutlineEntry};
use crate::error::CoreError;

lazy_static! {
    /// Default header pattern: "ORG" followed by 2-6 dot-separated integers
    static ref ORG_HEADER: Regex = Regex::new(r"\b(ORG \d+(?:\.\d+){1,5})\b").unwrap();
}

/// One extracted section: nesting level, source page (one-based), and the
/// raw text of that page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub level: u32,
    pub page: u32,
    pub text: String,
}

/// Detects numbered section headers in page text.
#[derive(Debug, Clone)]
pub struct HeaderScanner {
    pattern: Regex,
}

impl HeaderScanner {
    /// Build a scanner for headers of the form `<prefix> N(.N){1,5}`.
    /// The prefix is taken literally.
    pub fn new(prefix: &str) -> Result<Self, CoreError> {
        let pattern = format!(r"\b({} \d+(?:\.\d+){{1,5}})\b", regex::escape(prefix));
        let pattern =
            Regex::new(&pattern).map_err(|e| CoreError::InvalidPattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// All header tokens in the given page text, in order of appearance.
    pub fn find_headers<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Nesting level of a header token: dot separators + 1.
    pub fn level_of(title: &str) -> u32 {
        title.matches('.').count() as u32 + 1
    }
}

impl Default for HeaderScanner {
    fn default() -> Self {
        Self {
            pattern: ORG_HEADER.clone(),
        }
    }
}

/// Insertion-ordered mapping from section title to [`Section`].
///
/// First write wins: a title already present is never overwritten, which
/// gives outline-derived entries precedence over scanned headers.
#[derive(Debug, Default, Clone)]
pub struct SectionMap {
    order: Vec<String>,
    sections: HashMap<String, Section>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the title is already present. Returns true if inserted.
    pub fn insert_if_absent(&mut self, title: &str, section: Section) -> bool {
        if self.sections.contains_key(title) {
            return false;
        }
        self.order.push(title.to_string());
        self.sections.insert(title.to_string(), section);
        true
    }

    pub fn get(&self, title: &str) -> Option<&Section> {
        self.sections.get(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.sections.contains_key(title)
    }

    /// Titles in insertion order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (title, section) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.order
            .iter()
            .filter_map(move |t| self.sections.get(t).map(|s| (t.as_str(), s)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Build a map from an outline and page texts.
    ///
    /// Outline entries are seeded first, each attributed the text of the
    /// one-based page it names. Every page is then scanned for header
    /// tokens; matches not already present are inserted with the scanning
    /// page's number and text.
    pub fn build(
        outline: &[OutlineEntry],
        pages: &[(u32, &str)],
        scanner: &HeaderScanner,
    ) -> Self {
        let mut map = Self::new();

        for entry in outline {
            let text = pages
                .iter()
                .find(|(num, _)| *num == entry.page)
                .map(|(_, text)| (*text).to_string())
                .unwrap_or_default();
            map.insert_if_absent(
                &entry.title,
                Section {
                    level: entry.level,
                    page: entry.page,
                    text,
                },
            );
        }

        for (page_num, page_text) in pages {
            for header in scanner.find_headers(page_text) {
                map.insert_if_absent(
                    header,
                    Section {
                        level: HeaderScanner::level_of(header),
                        page: *page_num,
                        text: (*page_text).to_string(),
                    },
                );
            }
        }

        map
    }
}

/// Extract the section map for a loaded manual.
pub fn extract_sections(doc: &ManualDocument, scanner: &HeaderScanner) -> SectionMap {
    let pages: Vec<(u32, &str)> = doc.pages().collect();
    SectionMap::build(&doc.outline(), &pages, scanner)
}
