//! Tests for the AeroSync server API
//!
//! Handler tests run against the real router via axum-test with a stubbed
//! audit backend; property tests cover slot parsing and section lookup.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use base64::Engine;
use serde_json::{json, Value};

use aerosync_core::{HeaderScanner, Section, SectionMap};
use audit_engine::{AuditError, AuditReport, AuditService};

use crate::router;
use crate::state::{AppState, LoadedManual, Slot};

/// Audit backend returning a fixed report, recording nothing.
struct StubAuditor {
    reply: String,
}

#[async_trait]
impl AuditService for StubAuditor {
    async fn audit(
        &self,
        _isarp_checklist: &str,
        _input_text: &str,
    ) -> Result<AuditReport, AuditError> {
        Ok(AuditReport::parse(&self.reply))
    }
}

fn test_state(audit_reply: Option<&str>) -> AppState {
    let audit = audit_reply.map(|reply| {
        Arc::new(StubAuditor {
            reply: reply.to_string(),
        }) as Arc<dyn AuditService>
    });
    let upload_dir = std::env::temp_dir().join(format!("aerosync-test-{}", std::process::id()));
    std::fs::create_dir_all(&upload_dir).unwrap();
    AppState::new(audit, upload_dir, HeaderScanner::default())
}

fn manual_with(titles: &[(&str, &str)]) -> LoadedManual {
    let mut sections = SectionMap::new();
    for (i, (title, text)) in titles.iter().enumerate() {
        sections.insert_if_absent(
            title,
            Section {
                level: 2,
                page: i as u32 + 1,
                text: (*text).to_string(),
            },
        );
    }
    LoadedManual {
        filename: "test.pdf".to_string(),
        page_count: titles.len(),
        sections,
        loaded_at: 0,
    }
}

async fn preload(state: &AppState, slot: Slot, titles: &[(&str, &str)]) {
    state.slots.write().await.set(slot, manual_with(titles));
}

/// Build a one-page PDF containing the given text.
fn minimal_pdf(text: &str) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::new(router(test_state(None))).unwrap();
    let res = server.get("/health").await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "aerosync-server");
}

#[tokio::test]
async fn test_upload_extracts_sections() {
    let server = TestServer::new(router(test_state(None))).unwrap();
    let pdf = minimal_pdf("ORG 1.1 The operator shall have a management system");

    let res = server
        .post("/api/documents/1")
        .json(&json!({ "filename": "manual.pdf", "data": encode(&pdf) }))
        .await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["slot"], "first");
    assert_eq!(body["page_count"], 1);
    let titles: Vec<&str> = body["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"ORG 1.1"), "titles were {titles:?}");
}

#[tokio::test]
async fn test_upload_rejects_corrupt_pdf() {
    let server = TestServer::new(router(test_state(None))).unwrap();

    let res = server
        .post("/api/documents/2")
        .json(&json!({ "filename": "bad.pdf", "data": encode(b"not a pdf at all") }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = res.json();
    assert_eq!(body["code"], "DOCUMENT_LOAD_FAILED");
}

#[tokio::test]
async fn test_upload_rejects_invalid_base64() {
    let server = TestServer::new(router(test_state(None))).unwrap();

    let res = server
        .post("/api/documents/1")
        .json(&json!({ "filename": "bad.pdf", "data": "%%% not base64 %%%" }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = res.json();
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_unknown_slot_rejected() {
    let server = TestServer::new(router(test_state(None))).unwrap();
    let res = server.get("/api/documents/7/sections").await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sections_before_upload_is_not_found() {
    let server = TestServer::new(router(test_state(None))).unwrap();
    let res = server.get("/api/documents/1/sections").await;
    res.assert_status(StatusCode::NOT_FOUND);

    let body: Value = res.json();
    assert_eq!(body["code"], "DOCUMENT_NOT_LOADED");
}

#[tokio::test]
async fn test_get_section_text() {
    let state = test_state(None);
    preload(&state, Slot::First, &[("ORG 1.1", "management system text")]).await;
    let server = TestServer::new(router(state)).unwrap();

    let res = server.get("/api/documents/1/sections/ORG%201.1").await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert_eq!(body["title"], "ORG 1.1");
    assert_eq!(body["text"], "management system text");
}

#[tokio::test]
async fn test_compare_requires_both_documents() {
    let state = test_state(None);
    preload(&state, Slot::First, &[("ORG 1.1", "text")]).await;
    let server = TestServer::new(router(state)).unwrap();

    let res = server
        .post("/api/compare")
        .json(&json!({ "first_title": "ORG 1.1", "second_title": "ORG 1.1" }))
        .await;
    res.assert_status(StatusCode::NOT_FOUND);

    let body: Value = res.json();
    assert_eq!(body["code"], "DOCUMENT_NOT_LOADED");
}

#[tokio::test]
async fn test_compare_identical_sections() {
    let state = test_state(None);
    let text = "the operator shall define a safety policy";
    preload(&state, Slot::First, &[("ORG 1.1", text)]).await;
    preload(&state, Slot::Second, &[("ORG 1.1", text)]).await;
    let server = TestServer::new(router(state)).unwrap();

    let res = server
        .post("/api/compare")
        .json(&json!({ "first_title": "ORG 1.1", "second_title": "ORG 1.1" }))
        .await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert!((body["similarity"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(body["similarity_display"], "1.0000");
}

#[tokio::test]
async fn test_compare_unknown_section_is_not_found() {
    let state = test_state(None);
    preload(&state, Slot::First, &[("ORG 1.1", "a")]).await;
    preload(&state, Slot::Second, &[("ORG 2.1", "b")]).await;
    let server = TestServer::new(router(state)).unwrap();

    let res = server
        .post("/api/compare")
        .json(&json!({ "first_title": "ORG 1.1", "second_title": "ORG 9.9" }))
        .await;
    res.assert_status(StatusCode::NOT_FOUND);

    let body: Value = res.json();
    assert_eq!(body["code"], "SECTION_NOT_FOUND");
}

#[tokio::test]
async fn test_audit_without_backend_is_unavailable() {
    let state = test_state(None);
    preload(&state, Slot::First, &[("ORG 1.1", "a")]).await;
    preload(&state, Slot::Second, &[("ORG 1.1", "b")]).await;
    let server = TestServer::new(router(state)).unwrap();

    let res = server
        .post("/api/audit")
        .json(&json!({ "first_title": "ORG 1.1", "second_title": "ORG 1.1" }))
        .await;
    res.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_audit_reply_passes_through_unmodified() {
    let reply = "\
ASSESSMENT: Documentation aligns with the accountable executive requirement.
RECOMMENDATIONS: Document the delegation chain.
OVERALL_COMPLIANCE_SCORE: 8
OVERALL_COMPLIANCE_TAG: Compliant";

    let state = test_state(Some(reply));
    preload(&state, Slot::First, &[("ORG 1.1", "checklist text")]).await;
    preload(&state, Slot::Second, &[("ORG 1.1", "manual text")]).await;
    let server = TestServer::new(router(state)).unwrap();

    let res = server
        .post("/api/audit")
        .json(&json!({ "first_title": "ORG 1.1", "second_title": "ORG 1.1" }))
        .await;
    res.assert_status_ok();

    let body: Value = res.json();
    assert_eq!(body["success"], true);
    // The backend's reply reaches the display layer verbatim
    assert_eq!(body["report"]["raw"], reply);
    assert_eq!(body["report"]["score"], 8.0);
    assert_eq!(body["report"]["tag"], "Compliant");
}

mod property_tests {
    use proptest::prelude::*;

    use super::{manual_with, Slot};

    proptest! {
        /// Slot parsing accepts exactly the two documented spellings per slot
        #[test]
        fn slot_parse_rejects_unknown(s in "[a-z0-9]{1,10}") {
            let expected_ok = matches!(s.as_str(), "1" | "2" | "first" | "second");
            prop_assert_eq!(Slot::parse(&s).is_ok(), expected_ok);
        }

        /// Every inserted section title is retrievable with its text
        #[test]
        fn inserted_sections_are_retrievable(
            titles in proptest::collection::hash_set("[A-Z]{3} [0-9]\\.[0-9]", 1..8)
        ) {
            let pairs: Vec<(String, String)> = titles
                .iter()
                .map(|t| (t.clone(), format!("text for {t}")))
                .collect();
            let borrowed: Vec<(&str, &str)> = pairs
                .iter()
                .map(|(t, x)| (t.as_str(), x.as_str()))
                .collect();
            let manual = manual_with(&borrowed);

            for (title, text) in &pairs {
                let section = manual.sections.get(title);
                prop_assert!(section.is_some());
                prop_assert_eq!(&section.unwrap().text, text);
            }
        }
    }
}
