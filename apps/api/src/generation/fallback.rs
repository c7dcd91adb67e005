//! Canned question set used whenever live generation fails.

use crate::models::interview::{
    Difficulty, GeneratedQuestion, GenerationResult, PreferencePayload, QuestionType,
};

const STACK_PLACEHOLDER: &str = "your tech stack";

/// Always returns exactly two questions with `fallback = true`. Pure.
pub fn fallback_questions(payload: &PreferencePayload) -> GenerationResult {
    let stack = payload
        .tech_stack
        .first()
        .map(String::as_str)
        .unwrap_or(STACK_PLACEHOLDER);

    GenerationResult {
        questions: vec![
            GeneratedQuestion {
                id: "q1".to_string(),
                text: format!(
                    "Tell me about your experience as a {}.",
                    payload.role_or_default()
                ),
                question_type: QuestionType::Behavioral,
                difficulty: Difficulty::Easy,
                estimated_seconds: 60,
            },
            GeneratedQuestion {
                id: "q2".to_string(),
                text: format!("Describe a challenging technical problem you solved in {stack}."),
                question_type: QuestionType::Technical,
                difficulty: Difficulty::Medium,
                estimated_seconds: 90,
            },
        ],
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_has_two_questions() {
        let result = fallback_questions(&PreferencePayload::default());
        assert!(result.fallback);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.questions[0].question_type, QuestionType::Behavioral);
        assert_eq!(result.questions[1].question_type, QuestionType::Technical);
    }

    #[test]
    fn test_fallback_uses_defaults_for_empty_payload() {
        let result = fallback_questions(&PreferencePayload::default());
        assert_eq!(
            result.questions[0].text,
            "Tell me about your experience as a developer."
        );
        assert_eq!(
            result.questions[1].text,
            "Describe a challenging technical problem you solved in your tech stack."
        );
    }

    #[test]
    fn test_fallback_interpolates_role_and_first_stack_entry() {
        let payload = PreferencePayload::from_json(&json!({
            "role": "Data Engineer",
            "techStack": "spark, airflow"
        }));
        let result = fallback_questions(&payload);
        assert!(result.questions[0].text.contains("Data Engineer"));
        assert!(result.questions[1].text.ends_with("in spark."));
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let payload = PreferencePayload::from_json(&json!({"role": "SRE", "techStack": ["k8s"]}));
        assert_eq!(fallback_questions(&payload), fallback_questions(&payload));
    }
}
