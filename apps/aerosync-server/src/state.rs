//! Application state for the AeroSync server
//!
//! Two in-memory document slots (first/second) plus the audit service.
//! Nothing persists across restarts; uploads land on disk only because
//! documents are written to fixed local filenames before parsing.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use aerosync_core::{HeaderScanner, SectionMap};
use audit_engine::AuditService;

use crate::error::ServerError;

/// Which of the two document slots an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// Parse a slot from a path segment: "1"/"first" or "2"/"second".
    pub fn parse(s: &str) -> Result<Self, ServerError> {
        match s.to_lowercase().as_str() {
            "1" | "first" => Ok(Slot::First),
            "2" | "second" => Ok(Slot::Second),
            other => Err(ServerError::InvalidRequest(format!(
                "Unknown document slot '{}'. Use '1' or '2'",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Slot::First => "first",
            Slot::Second => "second",
        }
    }

    /// Fixed local filename uploads for this slot are written to.
    pub fn upload_filename(&self) -> &'static str {
        match self {
            Slot::First => "uploaded_1.pdf",
            Slot::Second => "uploaded_2.pdf",
        }
    }
}

/// A parsed upload held in a slot.
pub struct LoadedManual {
    pub filename: String,
    pub page_count: usize,
    pub sections: SectionMap,
    pub loaded_at: i64,
}

#[derive(Default)]
pub struct Slots {
    pub first: Option<LoadedManual>,
    pub second: Option<LoadedManual>,
}

impl Slots {
    pub fn get(&self, slot: Slot) -> Option<&LoadedManual> {
        match slot {
            Slot::First => self.first.as_ref(),
            Slot::Second => self.second.as_ref(),
        }
    }

    pub fn set(&mut self, slot: Slot, manual: LoadedManual) {
        match slot {
            Slot::First => self.first = Some(manual),
            Slot::Second => self.second = Some(manual),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub slots: Arc<RwLock<Slots>>,
    /// None when no API key is configured; the audit endpoint then 503s.
    pub audit: Option<Arc<dyn AuditService>>,
    pub upload_dir: PathBuf,
    pub scanner: HeaderScanner,
}

impl AppState {
    pub fn new(
        audit: Option<Arc<dyn AuditService>>,
        upload_dir: PathBuf,
        scanner: HeaderScanner,
    ) -> Self {
        Self {
            slots: Arc::new(RwLock::new(Slots::default())),
            audit,
            upload_dir,
            scanner,
        }
    }
}
