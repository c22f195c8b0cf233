use serde::{Deserialize, Serialize};

/// Structured record returned for a processed CV.
///
/// `summary` and `skills` are mandatory and non-empty after coercion;
/// `experience_years` is best-effort and defaults to 0.0 when the model
/// reply does not carry a usable number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvSummary {
    pub summary: String,
    pub skills: Vec<String>,
    pub experience_years: f64,
}
