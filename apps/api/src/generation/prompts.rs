// Prompt text for interview question generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Question generation prompt template.
/// Replace: {profile_json}, {json_only_instruction}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"You are an interview generator. Given the following user profile and preferences, generate a JSON object with a top-level key "questions" that is an array of question objects. Each question object should include: id (string), text (string), type ("technical" or "behavioral"), difficulty ("easy"|"medium"|"hard"), and estimated_seconds (number).

Schema:
{
  "questions": [
    {
      "id": "q1",
      "text": "Explain how React hooks replace lifecycle methods.",
      "type": "technical",
      "difficulty": "medium",
      "estimated_seconds": 90
    }
  ]
}

User profile (JSON): {profile_json}

{json_only_instruction}"#;
