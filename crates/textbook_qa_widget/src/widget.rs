//! Conversation state for the chat widget: ordered message list, one
//! in-flight request at a time, greeting on first open.

use std::sync::Mutex;

use chrono::Utc;
use textbook_qa_client::ChatClient;
use uuid::Uuid;

use crate::message::{ChatMessage, Role, SourceLink};

/// Assistant greeting seeded when the widget is first opened.
pub const GREETING: &str = "Hello! I'm your AI assistant for the Physical AI & Humanoid Robotics Textbook. How can I help you today?";

/// Assistant reply substituted for any failed exchange. Backend detail goes
/// to the log, never to the conversation.
pub const REQUEST_FAILED_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

struct WidgetState {
    open: bool,
    busy: bool,
    next_id: u64,
    messages: Vec<ChatMessage>,
}

impl WidgetState {
    fn push(&mut self, role: Role, content: String, sources: Vec<SourceLink>) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            content,
            role,
            timestamp: Utc::now(),
            sources,
        });
    }

    fn seed_greeting(&mut self) {
        if self.messages.is_empty() {
            self.push(Role::Assistant, GREETING.to_string(), Vec::new());
        }
    }
}

/// Chat widget controller. Owns the conversation; a presentation layer reads
/// snapshots via [`messages`](Self::messages) and drives
/// [`submit`](Self::submit). State mutations are synchronous; the lock is
/// never held across the network call.
pub struct ChatWidget {
    client: ChatClient,
    session_id: String,
    state: Mutex<WidgetState>,
}

impl ChatWidget {
    /// New closed widget with an empty conversation and a fresh session id.
    /// The session id lives as long as the widget and is sent with every
    /// exchange.
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            session_id: format!("session-{}", Uuid::new_v4()),
            state: Mutex::new(WidgetState {
                open: false,
                busy: false,
                next_id: 0,
                messages: Vec::new(),
            }),
        }
    }

    /// Session identifier correlating this conversation's exchanges.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Open the widget. The first open seeds the assistant greeting; opening
    /// again, or with history present, changes nothing else.
    pub fn open(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.open = true;
        state.seed_greeting();
    }

    /// Close the widget. History is kept.
    pub fn close(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.open = false;
    }

    /// Flip between open and closed, with [`open`](Self::open)'s seeding
    /// semantics.
    pub fn toggle(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.open = !state.open;
        if state.open {
            state.seed_greeting();
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().map(|s| s.open).unwrap_or(false)
    }

    /// True while a submission is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        self.state.lock().map(|s| s.busy).unwrap_or(false)
    }

    /// Snapshot of the conversation, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state
            .lock()
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// Submit a user query. Blank input, or a call while a request is
    /// already in flight, is a silent no-op. Every accepted submission
    /// appends the user message and exactly one assistant reply; a failed
    /// exchange appends the fixed apology and nothing reaches the caller.
    pub async fn submit(&self, text: &str) {
        let query = text.trim();
        if query.is_empty() {
            return;
        }
        {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            if state.busy {
                return;
            }
            state.busy = true;
            state.push(Role::User, query.to_string(), Vec::new());
        }

        let result = self.client.ask(query, Some(&self.session_id)).await;

        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match result {
            Ok(response) => {
                let sources = response
                    .sources
                    .into_iter()
                    .map(SourceLink::from)
                    .collect();
                state.push(Role::Assistant, response.answer, sources);
            }
            Err(error) => {
                tracing::warn!(session_id = %self.session_id, %error, "chat request failed");
                state.push(Role::Assistant, REQUEST_FAILED_REPLY.to_string(), Vec::new());
            }
        }
        state.busy = false;
    }
}
