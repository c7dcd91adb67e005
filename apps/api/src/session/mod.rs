//! Preference collection boundary.
//!
//! Two intake channels produce the same [`PreferencePayload`]: a structured
//! selection from a fixed menu, or a voice-agent conversation whose events
//! arrive on a channel. Only `conversation-update.collectedData` crosses into
//! the generation request; every other event is an opaque notification.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::models::interview::{Difficulty, Level, PreferencePayload, Preferences};

pub mod client;
pub mod scoring;

/// Interview types offered by the structured menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewKind {
    Technical,
    Behavioral,
    SystemDesign,
}

impl InterviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewKind::Technical => "technical",
            InterviewKind::Behavioral => "behavioral",
            InterviewKind::SystemDesign => "system-design",
        }
    }
}

/// Values picked on the start screen. No free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FormSelection {
    pub interview_type: InterviewKind,
    pub difficulty: Difficulty,
}

impl FormSelection {
    pub fn to_payload(&self) -> PreferencePayload {
        self.complete(&json!({}))
    }

    /// Builds a payload from agent-collected data, filling gaps from the selection.
    ///
    /// `preferences` defaults to `{focus: "general"}` only when the agent sent
    /// none (absent or null); an empty object is forwarded as is.
    pub fn complete(&self, collected: &Value) -> PreferencePayload {
        let mut payload = PreferencePayload::from_json(collected);
        let kind = self.interview_type.as_str();

        if payload.role.is_none() {
            payload.extra.remove("role");
            payload.role = Some(kind.to_string());
        }
        if payload.level.is_none() {
            payload.extra.remove("level");
            payload.level = Some(Level::from(self.difficulty.as_str().to_string()));
        }
        if payload.interview_type.is_none() {
            payload.extra.remove("interviewType");
            payload.interview_type = Some(kind.to_string());
        }
        if collected.get("preferences").map_or(true, Value::is_null) {
            payload.preferences = Preferences {
                focus: Some("general".to_string()),
                extra: Map::new(),
            };
        }
        payload
    }
}

/// Notifications emitted by the voice agent, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AgentEvent {
    CallStart,
    CallEnd,
    Message {
        #[serde(default)]
        message: Value,
    },
    Error {
        #[serde(default)]
        error: Value,
    },
    ConversationUpdate {
        #[serde(default, rename = "collectedData")]
        collected_data: Option<Value>,
    },
    SpeechStart,
    SpeechEnd,
}

/// Buffers collected data for one agent call.
pub struct CollectionSession {
    selection: FormSelection,
    collected: Option<Value>,
}

impl CollectionSession {
    pub fn new(selection: FormSelection) -> Self {
        Self {
            selection,
            collected: None,
        }
    }

    /// Applies one event. Returns `true` once the call has ended.
    pub fn observe(&mut self, event: AgentEvent) -> bool {
        match event {
            AgentEvent::ConversationUpdate {
                collected_data: Some(data),
            } if !data.is_null() => {
                info!("Agent collected data");
                self.collected = Some(data);
            }
            AgentEvent::CallEnd => {
                info!("Agent call ended");
                return true;
            }
            AgentEvent::Error { error } => warn!("Agent error: {error}"),
            other => debug!("Agent event: {other:?}"),
        }
        false
    }

    /// Consumes events until the call ends or the channel closes.
    ///
    /// `None` means the agent never produced collected data and no generation
    /// should be attempted.
    pub async fn run(mut self, mut events: mpsc::Receiver<AgentEvent>) -> Option<PreferencePayload> {
        while let Some(event) = events.recv().await {
            if self.observe(event) {
                break;
            }
        }
        self.finish()
    }

    pub fn finish(self) -> Option<PreferencePayload> {
        let collected = self.collected?;
        Some(self.selection.complete(&collected))
    }
}
