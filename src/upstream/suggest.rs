use crate::results::EeatReport;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;
use std::sync::LazyLock;

/// Summary written when the generated text holds no usable JSON
pub const UNPARSEABLE_SUMMARY: &str =
    "Could not parse the suggestion response; check that the model answered with valid JSON.";

/// Free-form improvement advice for a scored page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorSuggestion {
    pub summary: String,
    #[serde(default)]
    pub details: Vec<AreaNote>,
}

/// Advice for one E-E-A-T dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaNote {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub note: String,
}

impl AdvisorSuggestion {
    pub fn unparseable() -> Self {
        Self {
            summary: UNPARSEABLE_SUMMARY.to_string(),
            details: Vec::new(),
        }
    }
}

/// Builds the prompt asking for a JSON summary plus per-dimension notes
pub fn build_prompt(report: &EeatReport, language: &str) -> String {
    let existing = report
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("({}) {}", i + 1, s.message))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Based on the following E-E-A-T scores of a web page, write a complete improvement report containing:"
    );
    let _ = writeln!(
        prompt,
        "1. summary: a short overview of which areas the site should improve first and the overall strategy."
    );
    let _ = writeln!(
        prompt,
        "2. details: for each of Experience, Expertise, Authoritativeness and Trustworthiness, the current score and how to improve it (as an array)."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "--- Report ---");
    let _ = writeln!(prompt, "Title: {}", report.title.as_deref().unwrap_or(""));
    let _ = writeln!(prompt, "URL: {}", report.url);
    let _ = writeln!(prompt, "Scores:");
    let _ = writeln!(prompt, "- Experience: {}", report.scores.experience);
    let _ = writeln!(prompt, "- Expertise: {}", report.scores.expertise);
    let _ = writeln!(prompt, "- Authoritativeness: {}", report.scores.authoritativeness);
    let _ = writeln!(prompt, "- Trustworthiness: {}", report.scores.trustworthiness);
    let _ = writeln!(prompt, "Existing suggestions:");
    let _ = writeln!(prompt, "{}", existing);
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Answer in {}. Output only JSON, without explanations or comments, in this format:",
        language
    );
    prompt.push_str(
        r#"{
  "summary": "overview",
  "details": [
    { "area": "Experience", "score": 0, "note": "advice" }
  ]
}
"#,
    );
    prompt
}

/// Pulls the first `{ ... }` span out of generated text and parses it.
///
/// Falls back to a fixed placeholder when there is no span or it does not
/// parse; this never fails.
pub fn parse_suggestion(raw: &str) -> AdvisorSuggestion {
    static JSON_SPAN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex should be valid"));

    let Some(span) = JSON_SPAN.find(raw) else {
        ::log::warn!("Suggestion response contains no JSON object");
        return AdvisorSuggestion::unparseable();
    };

    match serde_json::from_str::<AdvisorSuggestion>(span.as_str()) {
        Ok(suggestion) => suggestion,
        Err(e) => {
            ::log::warn!("Suggestion JSON parse failed: {}", e);
            AdvisorSuggestion::unparseable()
        }
    }
}
