//! Coercion of free-form model replies into a validated [`CvSummary`].
//!
//! The input is untrusted: the JSON may be wrapped in explanatory prose or a
//! markdown code fence, skills may arrive as an array or a delimited string,
//! and experience may be a number or a phrase like "5.5 years". Summary and
//! skills are mandatory; experience is best-effort and defaults to 0.0.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::summary::CvSummary;
use crate::summarize::SummarizeError;

// A fenced code block whose interior holds a JSON object.
static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fenced JSON regex")
});

static SKILL_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\n]").expect("valid skill separator regex"));

static FIRST_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("valid decimal number regex"));

/// Parses a raw model reply into a validated summary record.
pub fn coerce_reply(raw: &str) -> Result<CvSummary, SummarizeError> {
    let candidate = locate_json(raw).ok_or_else(|| {
        SummarizeError::MalformedResponse("no JSON object found in reply".to_string())
    })?;

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;

    let summary = coerce_string(value.get("summary"));
    if summary.is_empty() {
        return Err(SummarizeError::MissingSummary);
    }

    let skills = coerce_skills(value.get("skills"));
    if skills.is_empty() {
        return Err(SummarizeError::MissingSkills);
    }

    let experience_years = coerce_experience(value.get("experience_years"));

    Ok(CvSummary {
        summary,
        skills,
        experience_years,
    })
}

/// Locates the JSON candidate inside a reply: the interior of a fenced code
/// block when present, then the span from the first `{` to the last `}`.
fn locate_json(raw: &str) -> Option<&str> {
    let text = raw.trim();
    let text = match FENCED_JSON.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    };
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start <= end).then(|| &text[start..=end])
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// An array is taken element-wise; a bare string is split on commas,
/// semicolons, and newlines. Anything else yields no skills. Order is
/// preserved and empties are dropped.
fn coerce_skills(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(skill_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => SKILL_SEPARATORS
            .split(s)
            .map(|part| part.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn skill_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Numbers pass through; strings contribute their first decimal substring.
/// Everything else, including parse failures, recovers to 0.0 — experience
/// is the one field that never fails the pipeline.
fn coerce_experience(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => FIRST_DECIMAL
            .find(s)
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        _ => None,
    };
    parsed.unwrap_or(0.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_reply_with_prose_and_string_experience() {
        let raw = "Here you go:\n```json\n{\"summary\":\"ok CV\",\"skills\":[\"Go\",\" Rust \"],\"experience_years\":\"5.5 years\"}\n```";
        let result = coerce_reply(raw).unwrap();
        assert_eq!(result.summary, "ok CV");
        assert_eq!(result.skills, vec!["Go", "Rust"]);
        assert!((result.experience_years - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_plain_json_without_fences() {
        let raw = r#"{"summary":"Backend engineer","skills":["Rust"],"experience_years":3}"#;
        let result = coerce_reply(raw).unwrap();
        assert_eq!(result.summary, "Backend engineer");
        assert!((result.experience_years - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = "Sure! The result is {\"summary\":\"ok\",\"skills\":[\"Go\"],\"experience_years\":1} hope that helps.";
        let result = coerce_reply(raw).unwrap();
        assert_eq!(result.summary, "ok");
        assert_eq!(result.skills, vec!["Go"]);
    }

    #[test]
    fn test_skills_as_delimited_string() {
        let raw = r#"{"summary":"ok","skills":"Go; Rust; Python","experience_years":2}"#;
        let result = coerce_reply(raw).unwrap();
        assert_eq!(result.skills, vec!["Go", "Rust", "Python"]);
    }

    #[test]
    fn test_skills_string_split_on_newlines_and_commas() {
        let raw = "{\"summary\":\"ok\",\"skills\":\"Go,Rust\\nPython\",\"experience_years\":2}";
        let result = coerce_reply(raw).unwrap();
        assert_eq!(result.skills, vec!["Go", "Rust", "Python"]);
    }

    #[test]
    fn test_non_string_skill_elements_are_stringified() {
        let raw = r#"{"summary":"ok","skills":[1,"Go"],"experience_years":0}"#;
        let result = coerce_reply(raw).unwrap();
        assert_eq!(result.skills, vec!["1", "Go"]);
    }

    #[test]
    fn test_empty_summary_is_rejected() {
        let raw = r#"{"summary":"","skills":["Go"],"experience_years":2}"#;
        assert!(matches!(
            coerce_reply(raw),
            Err(SummarizeError::MissingSummary)
        ));
    }

    #[test]
    fn test_missing_summary_is_rejected() {
        let raw = r#"{"skills":["Go"],"experience_years":2}"#;
        assert!(matches!(
            coerce_reply(raw),
            Err(SummarizeError::MissingSummary)
        ));
    }

    #[test]
    fn test_missing_skills_is_rejected() {
        let raw = r#"{"summary":"ok","experience_years":2}"#;
        assert!(matches!(
            coerce_reply(raw),
            Err(SummarizeError::MissingSkills)
        ));
    }

    #[test]
    fn test_skills_of_unexpected_type_is_rejected() {
        let raw = r#"{"summary":"ok","skills":42,"experience_years":2}"#;
        assert!(matches!(
            coerce_reply(raw),
            Err(SummarizeError::MissingSkills)
        ));
    }

    #[test]
    fn test_reply_without_json_is_malformed() {
        assert!(matches!(
            coerce_reply("I could not process this document."),
            Err(SummarizeError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        assert!(matches!(
            coerce_reply(r#"{"summary":"ok","skills":["Go"}"#),
            Err(SummarizeError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_experience_defaults_to_zero_when_absent_or_unparseable() {
        let missing = r#"{"summary":"ok","skills":["Go"]}"#;
        assert!(coerce_reply(missing).unwrap().experience_years.abs() < f64::EPSILON);

        let unparseable = r#"{"summary":"ok","skills":["Go"],"experience_years":"several"}"#;
        assert!(coerce_reply(unparseable).unwrap().experience_years.abs() < f64::EPSILON);

        let null = r#"{"summary":"ok","skills":["Go"],"experience_years":null}"#;
        assert!(coerce_reply(null).unwrap().experience_years.abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_experience_clamps_to_zero() {
        let raw = r#"{"summary":"ok","skills":["Go"],"experience_years":-2}"#;
        assert!(coerce_reply(raw).unwrap().experience_years.abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_trip_through_serialization() {
        let original = CvSummary {
            summary: "Experienced platform engineer.".to_string(),
            skills: vec!["Rust".to_string(), "Kubernetes".to_string()],
            experience_years: 7.5,
        };
        let serialized = serde_json::to_string(&original).unwrap();
        let coerced = coerce_reply(&serialized).unwrap();
        assert_eq!(coerced, original);
    }
}
