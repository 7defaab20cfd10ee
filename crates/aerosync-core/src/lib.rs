//! Core manual-comparison functionality
//!
//! This crate provides the document-side pieces of AeroSync: loading PDF
//! manuals, deriving a section mapping from the declared outline plus an
//! in-page header scan, and scoring the lexical similarity of two section
//! texts with TF-IDF cosine similarity.

pub mod document;
pub mod error;
pub mod sections;
pub mod similarity;

pub use document::{ManualDocument, OutlineEntry};
pub use error::CoreError;
pub use sections::{extract_sections, HeaderScanner, Section, SectionMap};
pub use similarity::cosine_similarity;
