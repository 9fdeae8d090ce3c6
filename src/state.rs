use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::analysis_fetch::CapabilityRequest;
use crate::chat;
use crate::demo;
use crate::error::{FailureKind, RequestError};
use crate::game_mode::{GameMode, default_registry};
use crate::model::Capability;
use crate::narrative::Narrative;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Text(String),
    Analysis(Narrative),
    Failure {
        capability: Capability,
        kind: FailureKind,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub body: MessageBody,
    pub timestamp: DateTime<Local>,
}

impl Message {
    fn now(role: Role, body: MessageBody) -> Self {
        Self {
            role,
            body,
            timestamp: Local::now(),
        }
    }

    /// Transcript text as the chat view shows it.
    pub fn text(&self) -> String {
        match &self.body {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Analysis(narrative) => chat::message(narrative),
            MessageBody::Failure { text, .. } => text.clone(),
        }
    }

    pub fn capability(&self) -> Option<Capability> {
        match &self.body {
            MessageBody::Text(_) => None,
            MessageBody::Analysis(narrative) => Some(narrative.capability),
            MessageBody::Failure { capability, .. } => Some(*capability),
        }
    }
}

/// Updates sent from worker threads to the UI thread.
#[derive(Debug)]
pub enum Delta {
    Resolved {
        request_id: u64,
        capability: Capability,
        outcome: Result<Narrative, RequestError>,
    },
    Log(String),
}

/// Work handed to the provider thread.
#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Invoke {
        request_id: u64,
        request: CapabilityRequest,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub game_mode: GameMode,
    /// Where requests go, shown in the header and in transport failures.
    pub service_label: String,
    pub transcript: Vec<Message>,
    pub pending: usize,
    pub next_request_id: u64,
    pub logs: VecDeque<String>,
    pub input: String,
    pub input_active: bool,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll: u16,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(game_mode: GameMode, service_label: impl Into<String>) -> Self {
        let mut state = Self {
            game_mode,
            service_label: service_label.into(),
            transcript: Vec::new(),
            pending: 0,
            next_request_id: 1,
            logs: VecDeque::new(),
            input: String::new(),
            input_active: false,
            scroll: 0,
            help_overlay: false,
        };
        let greeting = greeting(&state.game_mode);
        state.push_message(Role::Assistant, MessageBody::Text(greeting));
        state
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn push_message(&mut self, role: Role, body: MessageBody) {
        self.transcript.push(Message::now(role, body));
        self.scroll = 0;
    }

    /// Records the user's intent and returns the request to dispatch.
    pub fn begin_invocation(&mut self, capability: Capability) -> (u64, CapabilityRequest) {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending += 1;

        self.push_message(Role::User, MessageBody::Text(activation_message(capability)));
        self.push_log(format!(
            "[INFO] #{request_id} {} ({}) -> {}",
            capability.id(),
            self.game_mode,
            self.service_label
        ));

        (request_id, demo::demo_request(capability, &self.game_mode))
    }

    /// Sends the input buffer as free text. Returns false when there was nothing to send.
    pub fn submit_input(&mut self) -> bool {
        let text = std::mem::take(&mut self.input);
        self.input_active = false;
        let text = text.trim().to_string();
        if text.is_empty() {
            return false;
        }
        let reply = free_text_reply(&text);
        self.push_message(Role::User, MessageBody::Text(text));
        self.push_message(Role::Assistant, MessageBody::Text(reply));
        true
    }

    pub fn cycle_game_mode(&mut self) {
        self.game_mode = default_registry().next_after(&self.game_mode);
        let name = &default_registry().profile(&self.game_mode).display_name;
        self.push_log(format!("[INFO] Game mode: {name}"));
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Resolved {
            request_id,
            capability,
            outcome,
        } => {
            state.pending = state.pending.saturating_sub(1);
            match outcome {
                Ok(narrative) => {
                    state.push_log(format!(
                        "[INFO] #{request_id} {} resolved ({} sections)",
                        capability.id(),
                        narrative.sections.len()
                    ));
                    state.push_message(Role::Assistant, MessageBody::Analysis(narrative));
                }
                Err(err) => {
                    state.push_log(format!(
                        "[WARN] #{request_id} {} failed: {err}",
                        capability.id()
                    ));
                    let text = failure_text(&err, &state.service_label);
                    state.push_message(
                        Role::Assistant,
                        MessageBody::Failure {
                            capability,
                            kind: err.kind(),
                            text,
                        },
                    );
                }
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn greeting(mode: &GameMode) -> String {
    let name = &default_registry().profile(mode).display_name;
    format!(
        "Hello! I'm your AI Assistant Coach for {name}. I can help you with:\n\n\
         🎯 **Main Features:**\n\
         • {} - Analyze individual performance with data-backed feedback\n\
         • {} - Generate game review agendas from match data\n\
         • {} - \"What if\" scenario analysis\n\n\
         💡 **Quick Actions:**\n\
         Press 1, 2 or 3 to run these features, or press i to ask me anything!",
        Capability::Insights.title(),
        Capability::MacroReview.title(),
        Capability::Prediction.title(),
    )
}

/// `Activating personalized insights...`
pub fn activation_message(capability: Capability) -> String {
    let words = match capability {
        Capability::Insights => "personalized insights",
        Capability::MacroReview => "macro review",
        Capability::Prediction => "hypothetical prediction",
    };
    format!("Activating {words}...")
}

pub fn free_text_reply(text: &str) -> String {
    format!(
        "I received your message: \"{text}\"\n\n\
         For detailed analysis, please use one of the main features above:\n\
         • 🎯 {}\n\
         • 📊 {}\n\
         • 🔮 {}\n\n\
         These features connect to the AI backend for comprehensive analysis!",
        Capability::Insights.title(),
        Capability::MacroReview.title(),
        Capability::Prediction.title(),
    )
}

pub fn failure_text(err: &RequestError, service_label: &str) -> String {
    match err.kind() {
        FailureKind::Transport => format!(
            "❌ Error: {err}\n\nMake sure the backend server is running at {service_label}"
        ),
        FailureKind::Service => format!("❌ Error: {err}"),
        FailureKind::Validation => {
            format!("⚠️ The analysis came back in a shape I could not read.\n\n{err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_uses_feature_words() {
        assert_eq!(
            activation_message(Capability::Prediction),
            "Activating hypothetical prediction..."
        );
        assert_eq!(
            activation_message(Capability::MacroReview),
            "Activating macro review..."
        );
    }

    #[test]
    fn greeting_names_the_game() {
        assert!(greeting(&GameMode::valorant()).contains("Coach for VALORANT"));
        assert!(greeting(&GameMode::new("dota-2")).contains("Coach for League of Legends"));
    }

    #[test]
    fn logs_are_capped() {
        let mut state = AppState::new(GameMode::valorant(), "offline");
        for i in 0..(MAX_LOGS + 25) {
            state.push_log(format!("[INFO] line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 25"));
    }

    #[test]
    fn blank_input_is_not_sent() {
        let mut state = AppState::new(GameMode::valorant(), "offline");
        state.input = "   ".to_string();
        state.input_active = true;
        assert!(!state.submit_input());
        assert_eq!(state.transcript.len(), 1);
        assert!(!state.input_active);
    }
}
