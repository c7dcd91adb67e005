//! Answer score heuristic shown after each recorded answer.
//!
//! Derived only from talk time, whether audio was captured, and the selected
//! difficulty. It does not look at what was said.

use crate::models::interview::Difficulty;

/// Score in 50..=100 for one recorded answer.
pub fn score_answer(duration_secs: u32, has_audio: bool, difficulty: Difficulty) -> u32 {
    let mut score: u32 = 50;

    score += match duration_secs {
        30..=120 => 25,
        20..=150 => 15,
        0..=9 => 5,
        _ => 0,
    };

    if has_audio {
        score += 25;
    }

    match difficulty {
        Difficulty::Hard => (score + 10).min(100),
        Difficulty::Easy => score.saturating_sub(10).max(50),
        Difficulty::Medium => score,
    }
}

pub fn answer_feedback(duration_secs: u32, has_audio: bool) -> String {
    if duration_secs < 10 {
        "Response was too brief. Try to provide more detailed answers.".to_string()
    } else if duration_secs > 150 {
        "Great detail! Consider being more concise in future interviews.".to_string()
    } else if !has_audio {
        "No audio detected. Please ensure your microphone is working.".to_string()
    } else {
        format!(
            "Good response! You spoke for {duration_secs} seconds. Keep it structured and confident."
        )
    }
}

pub fn performance_label(score: u32) -> &'static str {
    match score {
        80.. => "Excellent performance!",
        60..=79 => "Good job! Keep practicing.",
        _ => "Keep practicing to improve.",
    }
}
