//! API handlers for the AeroSync server
//!
//! Provides REST endpoints for:
//! - Document upload and section listing
//! - Section text retrieval
//! - Similarity comparison between two selected sections
//! - ISARP compliance audit of a selected section pair

use axum::{
    extract::{Path, State},
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use aerosync_core::{extract_sections, ManualDocument};
use audit_engine::AuditReport;

use crate::error::ServerError;
use crate::state::{AppState, LoadedManual, Slot};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "aerosync-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Upload request body
#[derive(Deserialize)]
pub struct UploadRequest {
    /// Original filename, for display only
    pub filename: String,

    /// Base64-encoded PDF bytes
    pub data: String,
}

/// Section listing entry
#[derive(Serialize)]
pub struct SectionInfo {
    pub title: String,
    pub level: u32,
    pub page: u32,
}

/// Upload / section listing response
#[derive(Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    pub slot: &'static str,
    pub filename: String,
    pub page_count: usize,
    pub section_count: usize,
    /// Unix timestamp of when the upload was parsed
    pub loaded_at: i64,
    pub sections: Vec<SectionInfo>,
}

fn section_listing(manual: &LoadedManual) -> Vec<SectionInfo> {
    manual
        .sections
        .iter()
        .map(|(title, section)| SectionInfo {
            title: title.to_string(),
            level: section.level,
            page: section.page,
        })
        .collect()
}

/// Handler: POST /api/documents/{slot}
///
/// Writes the upload to its fixed local filename, parses it, and extracts
/// the section mapping for the slot.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<DocumentResponse>, ServerError> {
    let slot = Slot::parse(&slot)?;

    info!(slot = slot.name(), filename = %req.filename, "document upload");

    let data = base64::engine::general_purpose::STANDARD
        .decode(&req.data)
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid base64 data: {}", e)))?;

    // Uploads go to a fixed per-slot filename before parsing
    let path = state.upload_dir.join(slot.upload_filename());
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to write upload: {}", e)))?;

    let scanner = state.scanner.clone();
    let parsed = tokio::task::spawn_blocking(move || {
        let doc = ManualDocument::load(&path)?;
        let sections = extract_sections(&doc, &scanner);
        Ok::<_, aerosync_core::CoreError>((doc.page_count(), sections))
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))?;

    let (page_count, sections) = parsed?;

    debug!(
        slot = slot.name(),
        pages = page_count,
        sections = sections.len(),
        "document parsed"
    );

    let manual = LoadedManual {
        filename: req.filename,
        page_count,
        sections,
        loaded_at: chrono::Utc::now().timestamp(),
    };
    let listing = section_listing(&manual);
    let section_count = listing.len();
    let filename = manual.filename.clone();
    let loaded_at = manual.loaded_at;

    state.slots.write().await.set(slot, manual);

    Ok(Json(DocumentResponse {
        success: true,
        slot: slot.name(),
        filename,
        page_count,
        section_count,
        loaded_at,
        sections: listing,
    }))
}

/// Handler: GET /api/documents/{slot}/sections
pub async fn handle_list_sections(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<DocumentResponse>, ServerError> {
    let slot = Slot::parse(&slot)?;
    let slots = state.slots.read().await;
    let manual = slots
        .get(slot)
        .ok_or_else(|| ServerError::DocumentNotLoaded(slot.name().to_string()))?;

    let listing = section_listing(manual);
    Ok(Json(DocumentResponse {
        success: true,
        slot: slot.name(),
        filename: manual.filename.clone(),
        page_count: manual.page_count,
        section_count: listing.len(),
        loaded_at: manual.loaded_at,
        sections: listing,
    }))
}

/// Section text response
#[derive(Serialize)]
pub struct SectionTextResponse {
    pub success: bool,
    pub slot: &'static str,
    pub title: String,
    pub level: u32,
    pub page: u32,
    pub text: String,
}

/// Handler: GET /api/documents/{slot}/sections/{title}
pub async fn handle_get_section(
    State(state): State<AppState>,
    Path((slot, title)): Path<(String, String)>,
) -> Result<Json<SectionTextResponse>, ServerError> {
    let slot = Slot::parse(&slot)?;
    let slots = state.slots.read().await;
    let manual = slots
        .get(slot)
        .ok_or_else(|| ServerError::DocumentNotLoaded(slot.name().to_string()))?;
    let section = manual
        .sections
        .get(&title)
        .ok_or_else(|| ServerError::SectionNotFound(title.clone()))?;

    Ok(Json(SectionTextResponse {
        success: true,
        slot: slot.name(),
        title,
        level: section.level,
        page: section.page,
        text: section.text.clone(),
    }))
}

/// Selection of one section from each document
#[derive(Deserialize)]
pub struct SelectionRequest {
    /// Section title from the first document
    pub first_title: String,

    /// Section title from the second document
    pub second_title: String,
}

/// A selected section's title and text
#[derive(Serialize)]
pub struct SelectedSection {
    pub title: String,
    pub text: String,
}

/// Comparison response
#[derive(Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub first: SelectedSection,
    pub second: SelectedSection,
    /// Cosine similarity in [0, 1]
    pub similarity: f64,
    /// Similarity formatted to four decimal places for display
    pub similarity_display: String,
}

/// Look up the selected pair of section texts, guarding that both slots
/// are loaded and both titles exist.
async fn selected_texts(
    state: &AppState,
    req: &SelectionRequest,
) -> Result<(String, String), ServerError> {
    let slots = state.slots.read().await;

    let first = slots
        .get(Slot::First)
        .ok_or_else(|| ServerError::DocumentNotLoaded("first".to_string()))?;
    let second = slots
        .get(Slot::Second)
        .ok_or_else(|| ServerError::DocumentNotLoaded("second".to_string()))?;

    let first_section = first
        .sections
        .get(&req.first_title)
        .ok_or_else(|| ServerError::SectionNotFound(req.first_title.clone()))?;
    let second_section = second
        .sections
        .get(&req.second_title)
        .ok_or_else(|| ServerError::SectionNotFound(req.second_title.clone()))?;

    Ok((first_section.text.clone(), second_section.text.clone()))
}

/// Handler: POST /api/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<CompareResponse>, ServerError> {
    let (first_text, second_text) = selected_texts(&state, &req).await?;

    let similarity = aerosync_core::cosine_similarity(&first_text, &second_text);

    info!(
        first = %req.first_title,
        second = %req.second_title,
        similarity,
        "compared sections"
    );

    Ok(Json(CompareResponse {
        success: true,
        first: SelectedSection {
            title: req.first_title,
            text: first_text,
        },
        second: SelectedSection {
            title: req.second_title,
            text: second_text,
        },
        similarity,
        similarity_display: format!("{:.4}", similarity),
    }))
}

/// Audit response
#[derive(Serialize)]
pub struct AuditResponse {
    pub success: bool,
    /// Section used as the ISARP reference (first document)
    pub reference_title: String,
    /// Section under audit (second document)
    pub candidate_title: String,
    pub report: AuditReport,
}

/// Handler: POST /api/audit
///
/// Uses the first document's section as the ISARP reference and the
/// second's as the candidate under audit.
pub async fn handle_audit(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<AuditResponse>, ServerError> {
    let audit = state.audit.clone().ok_or(ServerError::AuditUnavailable)?;

    let (reference_text, candidate_text) = selected_texts(&state, &req).await?;

    info!(
        reference = %req.first_title,
        candidate = %req.second_title,
        "audit requested"
    );

    let report = audit.audit(&reference_text, &candidate_text).await?;

    Ok(Json(AuditResponse {
        success: true,
        reference_title: req.first_title,
        candidate_title: req.second_title,
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "aerosync-server");
    }
}
