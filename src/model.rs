use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::game_mode::{GameMode, default_registry};

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    #[serde(rename = "personalized-insights")]
    Insights,
    #[serde(rename = "macro-review")]
    MacroReview,
    #[serde(rename = "predict-scenario")]
    Prediction,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::Insights,
        Capability::MacroReview,
        Capability::Prediction,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Capability::Insights => "personalized-insights",
            Capability::MacroReview => "macro-review",
            Capability::Prediction => "predict-scenario",
        }
    }

    pub fn from_id(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "personalized-insights" | "insights" => Some(Capability::Insights),
            "macro-review" | "review" => Some(Capability::MacroReview),
            "predict-scenario" | "hypothetical-prediction" | "prediction" => {
                Some(Capability::Prediction)
            }
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Capability::Insights => "Personalized Player Insights",
            Capability::MacroReview => "Automated Macro Review",
            Capability::Prediction => "Hypothetical Predictions",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// Enum fields accept any string (case-insensitive). Values outside the known
// set are kept lowercased in `Other` so they still render.
macro_rules! lenient_level {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn parse(raw: &str) -> Self {
                let lowered = raw.trim().to_lowercase();
                match lowered.as_str() {
                    $($text => $name::$variant,)+
                    _ => $name::Other(lowered),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(raw) => raw.as_str(),
                }
            }

            /// Uppercase form used in narrative text.
            pub fn badge(&self) -> String {
                self.as_str().to_uppercase()
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                $name::parse(&raw)
            }
        }

        impl From<$name> for String {
            fn from(level: $name) -> Self {
                level.as_str().to_string()
            }
        }
    };
}

lenient_level!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

lenient_level!(Priority {
    Low => "low",
    Medium => "medium",
    High => "high",
});

lenient_level!(AgendaStatus {
    Critical => "critical",
    Concern => "concern",
    Normal => "normal",
});

lenient_level!(Confidence {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DataPoint {
    pub metric: String,
    #[serde(deserialize_with = "metric_value")]
    pub value: Value,
    #[serde(default, deserialize_with = "text_or_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Insight {
    pub finding: String,
    #[serde(default, deserialize_with = "level_or_none")]
    pub severity: Option<Severity>,
    #[serde(default, deserialize_with = "text_or_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategicRecommendation {
    pub recommendation: String,
    #[serde(default, deserialize_with = "level_or_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "text_or_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InsightsResult {
    #[serde(alias = "playerName")]
    pub player_name: String,
    #[serde(alias = "dataPoints", default, deserialize_with = "vec_or_default")]
    pub data_points: Vec<DataPoint>,
    #[serde(default, deserialize_with = "vec_or_default")]
    pub insights: Vec<Insight>,
    #[serde(
        alias = "strategicRecommendations",
        default,
        deserialize_with = "vec_or_default"
    )]
    pub strategic_recommendations: Vec<StrategicRecommendation>,
    #[serde(alias = "aiCommentary", default, deserialize_with = "text_or_none")]
    pub ai_commentary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgendaItem {
    pub category: String,
    #[serde(default, deserialize_with = "text_or_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "text_or_none")]
    pub issue: Option<String>,
    #[serde(default, deserialize_with = "text_or_none")]
    pub detail: Option<String>,
    #[serde(default, deserialize_with = "text_or_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "level_or_none")]
    pub status: Option<AgendaStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MacroReviewResult {
    #[serde(
        alias = "matchId",
        default = "unknown_label",
        deserialize_with = "text_or_unknown"
    )]
    pub match_id: String,
    #[serde(default, deserialize_with = "text_or_none")]
    pub tournament: Option<String>,
    #[serde(default, deserialize_with = "text_or_none")]
    pub map: Option<String>,
    #[serde(alias = "finalScore", default, deserialize_with = "text_or_none")]
    pub final_score: Option<String>,
    #[serde(default, deserialize_with = "vec_or_default")]
    pub teams: Vec<String>,
    #[serde(alias = "agendaItems", default, deserialize_with = "vec_or_default")]
    pub agenda_items: Vec<AgendaItem>,
    #[serde(alias = "aiSummary", default, deserialize_with = "text_or_none")]
    pub ai_summary: Option<String>,
}

/// One side of the generic comparison pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub action: String,
    pub success_probability: Option<Value>,
    pub expected_value: Option<Value>,
    pub outcome: Option<String>,
    /// Keys beyond the known four, in input order.
    pub extra: Map<String, Value>,
}

impl ActionOutcome {
    fn from_map(mut map: Map<String, Value>) -> Result<Self, String> {
        let action = match map.shift_remove("action") {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(format!("action must be a string, got {}", kind_name(&other)));
            }
            None => return Err("action is required".to_string()),
        };
        let success_probability =
            take_present(&mut map, &["success_probability", "successProbability"]);
        let expected_value = take_present(&mut map, &["expected_value", "expectedValue"]);
        let outcome = match take_present(&mut map, &["outcome"]) {
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                return Err(format!("outcome must be a string, got {}", kind_name(&other)));
            }
            None => None,
        };
        Ok(Self {
            action,
            success_probability,
            expected_value,
            outcome,
            extra: map,
        })
    }

    /// Entries in render order, keyed by their wire names.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let mut out = vec![("action".to_string(), Value::String(self.action.clone()))];
        if let Some(v) = &self.success_probability {
            out.push(("success_probability".to_string(), v.clone()));
        }
        if let Some(v) = &self.expected_value {
            out.push(("expected_value".to_string(), v.clone()));
        }
        if let Some(v) = &self.outcome {
            out.push(("outcome".to_string(), Value::String(v.clone())));
        }
        out.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

/// The before/after comparison of a prediction, after alias resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ComparisonPair {
    /// `original_action` / `alternative_action`.
    Actions {
        original: Option<ActionOutcome>,
        alternative: Option<ActionOutcome>,
    },
    /// `contest_analysis` / `concede_analysis`.
    Objective {
        contest: Option<Map<String, Value>>,
        concede: Option<Map<String, Value>>,
    },
    None,
}

impl ComparisonPair {
    /// Primary and alternative sides as ordered key/value entries.
    pub fn sides(&self) -> (Option<Vec<(String, Value)>>, Option<Vec<(String, Value)>>) {
        match self {
            ComparisonPair::Actions {
                original,
                alternative,
            } => (
                original.as_ref().map(ActionOutcome::entries),
                alternative.as_ref().map(ActionOutcome::entries),
            ),
            ComparisonPair::Objective { contest, concede } => (
                contest.as_ref().map(map_entries),
                concede.as_ref().map(map_entries),
            ),
            ComparisonPair::None => (None, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub scenario: String,
    pub game_state: Map<String, Value>,
    pub comparison: ComparisonPair,
    pub recommendation: Option<String>,
    pub confidence: Option<Confidence>,
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    scenario: String,
    #[serde(alias = "gameState", default, deserialize_with = "map_or_none")]
    game_state: Option<Map<String, Value>>,
    #[serde(alias = "originalAction", default, deserialize_with = "map_or_none")]
    original_action: Option<Map<String, Value>>,
    #[serde(alias = "alternativeAction", default, deserialize_with = "map_or_none")]
    alternative_action: Option<Map<String, Value>>,
    #[serde(alias = "contestAnalysis", default, deserialize_with = "map_or_none")]
    contest_analysis: Option<Map<String, Value>>,
    #[serde(alias = "concedeAnalysis", default, deserialize_with = "map_or_none")]
    concede_analysis: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "text_or_none")]
    recommendation: Option<String>,
    #[serde(default, deserialize_with = "level_or_none")]
    confidence: Option<Confidence>,
    #[serde(alias = "aiAnalysis", default, deserialize_with = "text_or_none")]
    ai_analysis: Option<String>,
}

impl RawPrediction {
    fn resolve(self) -> Result<PredictionResult, String> {
        let comparison = if self.original_action.is_some() || self.alternative_action.is_some() {
            ComparisonPair::Actions {
                original: self.original_action.map(ActionOutcome::from_map).transpose()?,
                alternative: self
                    .alternative_action
                    .map(ActionOutcome::from_map)
                    .transpose()?,
            }
        } else if self.contest_analysis.is_some() || self.concede_analysis.is_some() {
            ComparisonPair::Objective {
                contest: self.contest_analysis,
                concede: self.concede_analysis,
            }
        } else {
            ComparisonPair::None
        };

        Ok(PredictionResult {
            scenario: self.scenario,
            game_state: self.game_state.unwrap_or_default(),
            comparison,
            recommendation: self.recommendation,
            confidence: self.confidence,
            ai_analysis: self.ai_analysis,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "capability", content = "payload")]
pub enum CapabilityPayload {
    #[serde(rename = "personalized-insights")]
    Insights(InsightsResult),
    #[serde(rename = "macro-review")]
    MacroReview(MacroReviewResult),
    #[serde(rename = "predict-scenario")]
    Prediction(PredictionResult),
}

/// A validated response. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityResult {
    pub game_mode: GameMode,
    #[serde(flatten)]
    pub payload: CapabilityPayload,
}

impl CapabilityResult {
    pub fn capability(&self) -> Capability {
        match self.payload {
            CapabilityPayload::Insights(_) => Capability::Insights,
            CapabilityPayload::MacroReview(_) => Capability::MacroReview,
            CapabilityPayload::Prediction(_) => Capability::Prediction,
        }
    }
}

/// Validates a service response for a capability the caller declared.
pub fn parse_result(
    capability: Capability,
    game_mode: &GameMode,
    raw: &str,
) -> Result<CapabilityResult, ModelError> {
    let value: Value = serde_json::from_str(raw.trim())?;
    result_from_value(capability, game_mode, value)
}

pub fn result_from_value(
    capability: Capability,
    game_mode: &GameMode,
    value: Value,
) -> Result<CapabilityResult, ModelError> {
    if !value.is_object() {
        return Err(ModelError::NotAnObject {
            found: kind_name(&value),
        });
    }
    let invalid = |message: String| ModelError::InvalidPayload {
        capability,
        message,
    };

    let payload = match capability {
        Capability::Insights => CapabilityPayload::Insights(
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?,
        ),
        Capability::MacroReview => CapabilityPayload::MacroReview(
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?,
        ),
        Capability::Prediction => {
            let raw: RawPrediction =
                serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
            CapabilityPayload::Prediction(raw.resolve().map_err(invalid)?)
        }
    };

    Ok(CapabilityResult {
        game_mode: game_mode.clone(),
        payload,
    })
}

/// Validates a self-describing `{ capability, game_mode, payload }` document.
pub fn parse_envelope(raw: &str) -> Result<CapabilityResult, ModelError> {
    let value: Value = serde_json::from_str(raw.trim())?;
    let Value::Object(mut root) = value else {
        return Err(ModelError::NotAnObject {
            found: kind_name(&value),
        });
    };

    let capability = match root.get("capability") {
        None | Some(Value::Null) => return Err(ModelError::MissingDiscriminant),
        Some(Value::String(id)) => {
            Capability::from_id(id).ok_or_else(|| ModelError::UnknownCapability(id.clone()))?
        }
        Some(other) => return Err(ModelError::UnknownCapability(other.to_string())),
    };

    let game_mode = ["game_mode", "gameMode", "game"]
        .iter()
        .find_map(|key| root.get(*key).and_then(Value::as_str))
        .map(|raw| default_registry().resolve(raw))
        .unwrap_or_else(GameMode::valorant);

    let payload = root
        .shift_remove("payload")
        .ok_or_else(|| ModelError::InvalidPayload {
            capability,
            message: "missing payload".to_string(),
        })?;

    result_from_value(capability, &game_mode, payload)
}

/// Wraps a raw payload into an envelope document.
pub fn envelope(capability: Capability, game_mode: &GameMode, payload: Value) -> Value {
    serde_json::json!({
        "capability": capability.id(),
        "game_mode": game_mode.as_str(),
        "payload": payload,
    })
}

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn map_entries(map: &Map<String, Value>) -> Vec<(String, Value)> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn take_present(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = map.shift_remove(*key) {
            if found.is_none() && !value.is_null() {
                found = Some(value);
            }
        }
    }
    found
}

fn unknown_label() -> String {
    UNKNOWN.to_string()
}

fn vec_or_default<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn map_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(value.filter(|m| !m.is_empty()))
}

fn text_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn level_or_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = text_or_none(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()).map(T::from))
}

fn text_or_unknown<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_or_none(deserializer)?.unwrap_or_else(unknown_label))
}

fn metric_value<'de, D>(deserializer: D) -> std::result::Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(_) | Value::Number(_) => Ok(value),
        other => Err(serde::de::Error::custom(format!(
            "data point value must be a string or number, got {}",
            kind_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_case_insensitive() {
        assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
        assert_eq!(Priority::parse(" High "), Priority::High);
        assert_eq!(Confidence::parse("Medium").badge(), "MEDIUM");
    }

    #[test]
    fn unknown_level_is_kept_lowercased() {
        let sev = Severity::parse("Extreme");
        assert_eq!(sev, Severity::Other("extreme".to_string()));
        assert_eq!(sev.badge(), "EXTREME");
    }

    #[test]
    fn blank_levels_are_absent() {
        let insight: Insight =
            serde_json::from_str(r#"{"finding": "Low KAST", "severity": " "}"#).expect("valid");
        assert_eq!(insight.severity, None);
        let item: AgendaItem =
            serde_json::from_str(r#"{"category": "Eco", "status": ""}"#).expect("valid");
        assert_eq!(item.status, None);
    }

    #[test]
    fn capability_ids_round_trip() {
        for cap in Capability::ALL {
            assert_eq!(Capability::from_id(cap.id()), Some(cap));
        }
        assert_eq!(
            Capability::from_id("hypothetical-prediction"),
            Some(Capability::Prediction)
        );
        assert_eq!(Capability::from_id("nope"), None);
    }

    #[test]
    fn action_outcome_requires_action() {
        let mut map = Map::new();
        map.insert("success_probability".to_string(), Value::from("15%"));
        assert!(ActionOutcome::from_map(map).is_err());
    }

    #[test]
    fn action_outcome_entries_keep_extras_last() {
        let raw = serde_json::json!({
            "risk": "high",
            "action": "Save",
            "expected_value": "High",
        });
        let Value::Object(map) = raw else {
            unreachable!()
        };
        let outcome = ActionOutcome::from_map(map).expect("valid");
        let keys: Vec<String> = outcome.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["action", "expected_value", "risk"]);
    }
}
