//! Structured audit report
//!
//! The model replies with free text organized into four labelled sections.
//! [`AuditReport::parse`] lifts those into structured fields while always
//! preserving the raw text, so an off-format reply still reaches the
//! display layer unmodified.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Section labels, tolerating markdown adornment around them
    static ref SECTION_LABEL: Regex = Regex::new(
        r"(?m)^[\s#*]*(ASSESSMENT|RECOMMENDATIONS|OVERALL_COMPLIANCE_SCORE|OVERALL_COMPLIANCE_TAG)\b[*\s]*:?[*\s]*"
    )
    .unwrap();
    static ref NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
}

/// Result of a compliance audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Detailed evaluation against the reference ISARPs.
    pub assessment: String,
    /// Actionable suggestions for improving compliance.
    pub recommendations: String,
    /// Numeric compliance rating, 0-10, when the reply carried one.
    pub score: Option<f32>,
    /// Compliance level tag, when the reply carried one.
    pub tag: Option<String>,
    /// The model's reply, verbatim.
    pub raw: String,
}

impl AuditReport {
    /// Parse a model reply into its labelled sections.
    ///
    /// Replies without recognizable labels produce a report with empty
    /// structured fields and everything in `raw`.
    pub fn parse(raw: &str) -> Self {
        let mut report = Self {
            assessment: String::new(),
            recommendations: String::new(),
            score: None,
            tag: None,
            raw: raw.to_string(),
        };

        let labels: Vec<(usize, usize, String)> = SECTION_LABEL
            .captures_iter(raw)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let name = cap.get(1)?.as_str().to_string();
                Some((whole.start(), whole.end(), name))
            })
            .collect();

        for (i, (_, content_start, name)) in labels.iter().enumerate() {
            let content_end = labels
                .get(i + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(raw.len());
            let content = raw[*content_start..content_end]
                .trim()
                .trim_end_matches('*')
                .trim();

            match name.as_str() {
                "ASSESSMENT" => report.assessment = content.to_string(),
                "RECOMMENDATIONS" => report.recommendations = content.to_string(),
                "OVERALL_COMPLIANCE_SCORE" => {
                    report.score = NUMBER
                        .find(content)
                        .and_then(|m| m.as_str().parse::<f32>().ok())
                        .filter(|s| (0.0..=10.0).contains(s));
                }
                "OVERALL_COMPLIANCE_TAG" => {
                    if !content.is_empty() {
                        report.tag = Some(content.to_string());
                    }
                }
                _ => {}
            }
        }

        report
    }
}
