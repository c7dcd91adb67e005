use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Seniority requested for the interview. Unrecognized values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Junior,
    Mid,
    Senior,
    Other(String),
}

impl From<String> for Level {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "junior" => Level::Junior,
            "mid" => Level::Mid,
            "senior" => Level::Senior,
            _ => Level::Other(value),
        }
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Junior => f.write_str("junior"),
            Level::Mid => f.write_str("mid"),
            Level::Senior => f.write_str("senior"),
            Level::Other(s) => f.write_str(s),
        }
    }
}

/// Free-form preferences; `focus` is the only field the generator relies on.
///
/// A `focus` that is not a string stays in `extra` under its own key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Preferences {
    pub fn is_empty(&self) -> bool {
        self.focus.is_none() && self.extra.is_empty()
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let mut extra = map.clone();
        let focus = match extra.remove("focus") {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                extra.insert("focus".to_string(), other);
                None
            }
            None => None,
        };
        Preferences { focus, extra }
    }
}

/// Preference data collected from the form or the voice agent.
///
/// Built leniently from an arbitrary JSON object via [`PreferencePayload::from_json`].
/// Unknown fields are carried in `extra`. A known field whose value cannot be
/// used (wrong type, blank) leaves its typed field at the default and keeps the
/// raw value in `extra` under the same key, so the serialized payload still holds
/// everything the caller sent.
///
/// Invariant: a known key is present in `extra` only while its typed field is at
/// the default, and defaults are not serialized, so no key is written twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack: Vec<String>,
    /// Negative values clamp to 0; 0 is the default and is not serialized.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub experience_years: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<String>,
    #[serde(default, skip_serializing_if = "Preferences::is_empty")]
    pub preferences: Preferences,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const KNOWN_FIELDS: [&str; 6] = [
    "role",
    "level",
    "techStack",
    "experienceYears",
    "interviewType",
    "preferences",
];

impl PreferencePayload {
    /// Total conversion from a request body. Anything that is not a JSON object
    /// yields the empty payload.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let mut extra: Map<String, Value> = obj
            .iter()
            .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let role = non_empty_str(obj.get("role"));
        if role.is_none() {
            keep_raw(obj, "role", &mut extra);
        }

        let level = non_empty_str(obj.get("level")).map(Level::from);
        if level.is_none() {
            keep_raw(obj, "level", &mut extra);
        }

        let tech_stack = obj.get("techStack").map(normalize_tech_stack).unwrap_or_default();
        if tech_stack.is_empty() {
            keep_raw(obj, "techStack", &mut extra);
        }

        let experience_years = match obj.get("experienceYears") {
            Some(Value::Number(n)) => {
                let years = n.as_f64().filter(|y| y.is_finite()).unwrap_or(0.0);
                if years == 0.0 {
                    keep_raw(obj, "experienceYears", &mut extra);
                }
                years.max(0.0)
            }
            _ => {
                keep_raw(obj, "experienceYears", &mut extra);
                0.0
            }
        };

        let interview_type = non_empty_str(obj.get("interviewType"));
        if interview_type.is_none() {
            keep_raw(obj, "interviewType", &mut extra);
        }

        let preferences = match obj.get("preferences") {
            Some(Value::Object(map)) if !map.is_empty() => Preferences::from_map(map),
            _ => {
                keep_raw(obj, "preferences", &mut extra);
                Preferences::default()
            }
        };

        Self {
            role,
            level,
            tech_stack,
            experience_years,
            interview_type,
            preferences,
            extra,
        }
    }

    /// Role used in prompts and fallback text.
    pub fn role_or_default(&self) -> &str {
        self.role.as_deref().unwrap_or("developer")
    }
}

/// Copies a present, non-null raw value into `extra`.
fn keep_raw(obj: &Map<String, Value>, key: &str, extra: &mut Map<String, Value>) {
    if let Some(raw) = obj.get(key).filter(|v| !v.is_null()) {
        extra.insert(key.to_string(), raw.clone());
    }
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalizes a tech stack sent either as an array or as a comma-separated string
/// into trimmed, non-empty entries in their original order.
pub fn normalize_tech_stack(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Technical,
    Behavioral,
}

impl QuestionType {
    /// Lenient parse; anything unrecognized is treated as technical.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "behavioral" | "behavioural" => QuestionType::Behavioral,
            _ => QuestionType::Technical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Lenient parse; anything unrecognized is treated as medium.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Answer time assumed when the generator does not provide one.
    pub fn default_seconds(&self) -> u32 {
        match self {
            Difficulty::Easy => 60,
            Difficulty::Medium => 90,
            Difficulty::Hard => 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub estimated_seconds: u32,
}

/// Ordered question set. `fallback` is true only for canned content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default)]
    pub fallback: bool,
}

/// One persisted generation event. Written once, never updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub created_at: DateTime<Utc>,
    pub collected: PreferencePayload,
    pub generated: GenerationResult,
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tech_stack_from_delimited_string() {
        let stack = normalize_tech_stack(&json!("react, typescript, node"));
        assert_eq!(stack, vec!["react", "typescript", "node"]);
    }

    #[test]
    fn test_tech_stack_drops_empty_entries() {
        let stack = normalize_tech_stack(&json!(" rust ,, ,tokio, "));
        assert_eq!(stack, vec!["rust", "tokio"]);
    }

    #[test]
    fn test_tech_stack_array_is_unchanged() {
        let stack = normalize_tech_stack(&json!(["react"]));
        assert_eq!(stack, vec!["react"]);
    }

    #[test]
    fn test_from_json_non_object_is_empty() {
        assert_eq!(
            PreferencePayload::from_json(&json!([1, 2])),
            PreferencePayload::default()
        );
        assert_eq!(
            PreferencePayload::from_json(&Value::Null),
            PreferencePayload::default()
        );
    }

    #[test]
    fn test_from_json_ignores_wrong_types_and_keeps_unknown_fields() {
        let payload = PreferencePayload::from_json(&json!({
            "role": 42,
            "level": "Senior",
            "experienceYears": -3,
            "preferences": {"focus": "ownership", "pace": "slow"},
            "sessionId": "abc"
        }));

        assert!(payload.role.is_none());
        assert_eq!(payload.extra.get("role"), Some(&json!(42)));
        assert_eq!(payload.level, Some(Level::Senior));
        assert_eq!(payload.experience_years, 0.0);
        assert_eq!(payload.preferences.focus.as_deref(), Some("ownership"));
        assert_eq!(payload.preferences.extra.get("pace"), Some(&json!("slow")));
        assert_eq!(payload.extra.get("sessionId"), Some(&json!("abc")));
    }

    #[test]
    fn test_unusable_known_fields_survive_serialization() {
        let payload = PreferencePayload::from_json(&json!({
            "role": 42,
            "experienceYears": "five",
            "techStack": {"frontend": "react"},
            "preferences": {"focus": ["hooks", "testing"], "pace": "slow"}
        }));

        assert!(payload.role.is_none());
        assert!(payload.tech_stack.is_empty());
        assert!(payload.preferences.focus.is_none());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "role": 42,
                "experienceYears": "five",
                "techStack": {"frontend": "react"},
                "preferences": {"focus": ["hooks", "testing"], "pace": "slow"}
            })
        );
    }

    #[test]
    fn test_non_object_and_empty_preferences_are_kept() {
        let value = serde_json::to_value(PreferencePayload::from_json(
            &json!({"preferences": "system design"}),
        ))
        .unwrap();
        assert_eq!(value, json!({"preferences": "system design"}));

        let value = serde_json::to_value(PreferencePayload::from_json(
            &json!({"preferences": {}, "techStack": [], "experienceYears": 0}),
        ))
        .unwrap();
        assert_eq!(value, json!({"preferences": {}, "techStack": [], "experienceYears": 0}));
    }

    #[test]
    fn test_negative_experience_clamps_to_default() {
        let payload = PreferencePayload::from_json(&json!({"experienceYears": -3}));
        assert_eq!(payload.experience_years, 0.0);
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({}));
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = PreferencePayload::from_json(&json!({
            "role": "Frontend Developer",
            "level": "junior",
            "techStack": ["react", "typescript"],
            "experienceYears": 2,
            "interviewType": "technical",
            "preferences": {"focus": "components, hooks, testing"}
        }));
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["techStack"], json!(["react", "typescript"]));
        assert_eq!(value["level"], json!("junior"));
        assert_eq!(value["interviewType"], json!("technical"));
        assert_eq!(value["preferences"]["focus"], json!("components, hooks, testing"));
    }

    #[test]
    fn test_unknown_level_round_trips_verbatim() {
        let level: Level = serde_json::from_value(json!("staff")).unwrap();
        assert_eq!(level, Level::Other("staff".to_string()));
        assert_eq!(serde_json::to_value(&level).unwrap(), json!("staff"));
    }

    #[test]
    fn test_question_serializes_type_field() {
        let question = GeneratedQuestion {
            id: "q1".to_string(),
            text: "Explain React hooks".to_string(),
            question_type: QuestionType::Technical,
            difficulty: Difficulty::Easy,
            estimated_seconds: 60,
        };
        assert_eq!(
            serde_json::to_value(&question).unwrap(),
            json!({
                "id": "q1",
                "text": "Explain React hooks",
                "type": "technical",
                "difficulty": "easy",
                "estimated_seconds": 60
            })
        );
    }
}
