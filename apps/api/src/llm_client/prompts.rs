// Cross-cutting prompt fragments. Feature modules keep their own prompts.rs.

/// Appended to every prompt that expects a machine-readable answer.
pub const JSON_ONLY_INSTRUCTION: &str = "Return strictly valid JSON and nothing else. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
