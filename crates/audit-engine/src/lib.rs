//! ISARP compliance auditing
//!
//! Assembles the fixed auditor prompt around a reference checklist and a
//! candidate text, submits a single chat-completion request, and parses
//! the reply into an [`AuditReport`]. The [`AuditService`] trait is the
//! only surface the rest of the system sees, so the model or vendor can
//! change without touching extraction or similarity code.

pub mod client;
pub mod config;
pub mod prompt;
pub mod report;

pub use client::{AuditError, AuditService, OpenAiAuditor};
pub use config::AuditConfig;
pub use report::AuditReport;
