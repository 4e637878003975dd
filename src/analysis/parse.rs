//! Validation of the LLM reply against the analysis contract
//!
//! A reply is accepted as-is when it matches the contract exactly. A reply
//! that is a JSON object but breaks the contract is salvaged field by field
//! with placeholders. Anything else (or a provider failure) gets the fixed
//! fallback result.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::exceptions::{ProviderError, SchemaViolation};

pub const NOT_AVAILABLE: &str = "Not available";
pub const UNKNOWN: &str = "Unknown";
pub const NOT_APPLICABLE: &str = "N/A";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const FAILED_PURPOSE: &str = "Analysis failed due to an error";

/// A parameter value as the contract allows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl ScalarValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(ScalarValue::Bool(*b)),
            Value::Number(n) => Some(ScalarValue::Number(n.clone())),
            Value::String(s) => Some(ScalarValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Number(n) => write!(f, "{n}"),
            ScalarValue::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEffect {
    pub parameter: String,
    pub original_value: ScalarValue,
    pub new_value: ScalarValue,
    pub purpose: String,
    pub effect: String,
}

/// Structured explanation of a profile's modifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAnalysis {
    pub overall_purpose: String,
    pub model_type: String,
    pub visual_effects: Vec<String>,
    pub functional_effects: Vec<String>,
    pub trade_offs: Vec<String>,
    pub optimization_suggestions: Vec<String>,
    pub parameter_effects: Vec<ParameterEffect>,
}

impl ProfileAnalysis {
    /// Fixed result used when no analysis could be obtained
    pub fn fallback() -> Self {
        Self {
            overall_purpose: FAILED_PURPOSE.to_string(),
            model_type: UNKNOWN.to_string(),
            visual_effects: Vec::new(),
            functional_effects: Vec::new(),
            trade_offs: Vec::new(),
            optimization_suggestions: Vec::new(),
            parameter_effects: Vec::new(),
        }
    }
}

/// How much of the reply could be trusted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Complete,
    Degraded { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub outcome: AnalysisOutcome,
    pub analysis: ProfileAnalysis,
}

impl AnalysisResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            outcome: AnalysisOutcome::Failed {
                reason: reason.into(),
            },
            analysis: ProfileAnalysis::fallback(),
        }
    }
}

/// The outermost `{ ... }` span, tolerating prose or code fences around it
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Strictly parse a reply against the contract
pub fn parse_profile_analysis(raw: &str) -> Result<ProfileAnalysis, SchemaViolation> {
    let json = extract_json_object(raw)
        .ok_or_else(|| SchemaViolation("reply contains no JSON object".to_string()))?;
    serde_json::from_str(json).map_err(|e| SchemaViolation(e.to_string()))
}

fn text_field(doc: &Map<String, Value>, key: &str, placeholder: &str, problems: &mut Vec<String>) -> String {
    match doc.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => {
            problems.push(format!("{key} missing or not a string"));
            placeholder.to_string()
        }
    }
}

fn list_field(doc: &Map<String, Value>, key: &str, problems: &mut Vec<String>) -> Vec<String> {
    let Some(Value::Array(items)) = doc.get(key) else {
        problems.push(format!("{key} missing or not an array"));
        return Vec::new();
    };
    let strings: Vec<String> = items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect();
    if strings.len() != items.len() {
        problems.push(format!("{key} has non-string entries"));
    }
    strings
}

fn salvage_effect(value: &Value, problems: &mut Vec<String>) -> Option<ParameterEffect> {
    let Some(effect) = value.as_object() else {
        problems.push("parameter_effects has a non-object entry".to_string());
        return None;
    };
    let scalar = |key: &str, problems: &mut Vec<String>| {
        effect.get(key).and_then(ScalarValue::from_json).unwrap_or_else(|| {
            problems.push(format!("parameter_effects.{key} missing or not a scalar"));
            ScalarValue::Text(NOT_APPLICABLE.to_string())
        })
    };
    Some(ParameterEffect {
        parameter: text_field(effect, "parameter", UNKNOWN, problems),
        original_value: scalar("original_value", problems),
        new_value: scalar("new_value", problems),
        purpose: text_field(effect, "purpose", NOT_SPECIFIED, problems),
        effect: text_field(effect, "effect", NOT_SPECIFIED, problems),
    })
}

/// Lenient parse: keep what is valid, placeholder the rest.
///
/// Returns `None` unless the reply holds a JSON object.
pub fn salvage(raw: &str) -> Option<(ProfileAnalysis, Vec<String>)> {
    let json = extract_json_object(raw)?;
    let Ok(Value::Object(doc)) = serde_json::from_str::<Value>(json) else {
        return None;
    };

    let mut problems = Vec::new();
    let parameter_effects = match doc.get("parameter_effects") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| salvage_effect(item, &mut problems))
            .collect(),
        _ => {
            problems.push("parameter_effects missing or not an array".to_string());
            Vec::new()
        }
    };

    let analysis = ProfileAnalysis {
        overall_purpose: text_field(&doc, "overall_purpose", NOT_AVAILABLE, &mut problems),
        model_type: text_field(&doc, "model_type", NOT_AVAILABLE, &mut problems),
        visual_effects: list_field(&doc, "visual_effects", &mut problems),
        functional_effects: list_field(&doc, "functional_effects", &mut problems),
        trade_offs: list_field(&doc, "trade_offs", &mut problems),
        optimization_suggestions: list_field(&doc, "optimization_suggestions", &mut problems),
        parameter_effects,
    };
    Some((analysis, problems))
}

/// Turn a provider reply (or failure) into a result that is always usable
pub fn interpret_profile_reply(reply: Result<String, ProviderError>) -> AnalysisResult {
    let raw = match reply {
        Ok(raw) => raw,
        Err(e) => {
            warn!("❌ {e}");
            return AnalysisResult::failed(e.to_string());
        }
    };

    let violation = match parse_profile_analysis(&raw) {
        Ok(analysis) => {
            debug!(
                "✅ Analysis covers {} parameters",
                analysis.parameter_effects.len()
            );
            return AnalysisResult {
                outcome: AnalysisOutcome::Complete,
                analysis,
            };
        }
        Err(violation) => violation,
    };

    match salvage(&raw) {
        Some((analysis, problems)) => {
            let reason = if problems.is_empty() {
                violation.0
            } else {
                problems.join("; ")
            };
            warn!("⚠️ Analysis reply salvaged: {reason}");
            AnalysisResult {
                outcome: AnalysisOutcome::Degraded { reason },
                analysis,
            }
        }
        None => {
            warn!("❌ {violation}");
            AnalysisResult::failed(violation.to_string())
        }
    }
}

/// Free-text troubleshooting advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guidance {
    pub text: String,
    /// True when `text` is the canned message rather than a real answer
    pub fallback: bool,
}

pub fn interpret_guidance_reply(reply: Result<String, ProviderError>) -> Guidance {
    match reply {
        Ok(text) => Guidance {
            text: text.trim().to_string(),
            fallback: false,
        },
        Err(e) => {
            warn!("❌ {e}");
            Guidance {
                text: format!(
                    "Troubleshooting guidance is unavailable ({e}). Check the LLM provider settings and try again."
                ),
                fallback: true,
            }
        }
    }
}
