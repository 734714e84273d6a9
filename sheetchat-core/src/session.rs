//! Session state: the current workbook and the conversation transcript

use chrono::Utc;

use crate::analysis::{AnalysisBackend, Turn, TurnRole};
use crate::error::SessionError;
use crate::ingest::Workbook;
use crate::prompt::build_system_instruction;

/// Message id of the UI greeting; excluded from the history sent upstream.
pub const GREETING_ID: &str = "init";

/// Monotone tag incremented on every reset; results produced under an older
/// generation are discarded instead of applied.
pub type Generation = u64;

const APOLOGY: &str =
    "Sorry, I encountered an error analyzing your request. Please try again.";
const EMPTY_REPLY_FALLBACK: &str = "I couldn't generate a response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// One transcript entry. The list is append-only and in-memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Owner of all mutable per-session state.
///
/// The workbook is replaced wholesale on a new ingestion or cleared on
/// reset; no partial mutation exists. Calls take `&mut self`, so a single
/// session cannot interleave two operations; the generation counter guards
/// against applying results that were produced before a reset.
#[derive(Debug, Default)]
pub struct Session {
    workbook: Option<Workbook>,
    messages: Vec<ChatMessage>,
    generation: Generation,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Drop the workbook and transcript and invalidate in-flight results.
    pub fn reset(&mut self) {
        self.workbook = None;
        self.messages.clear();
        self.generation += 1;
    }

    /// Install a freshly ingested workbook, replacing all session state and
    /// seeding the transcript with the greeting message.
    ///
    /// `generation` must be the value of [`Session::generation`] captured
    /// when the ingestion started; a result from before a reset is stale
    /// and is discarded (returns `false`).
    pub fn install_workbook(&mut self, generation: Generation, workbook: Workbook) -> bool {
        if generation != self.generation {
            log::debug!(
                "discarding stale ingestion result (generation {} != {})",
                generation,
                self.generation
            );
            return false;
        }

        let sheet_names = workbook.sheet_names().join(", ");
        let greeting = format!(
            "Hi! I've analyzed **{}**. \n\nI found **{} sheets**: {}. \n\n\
             You can ask me to analyze data from a specific sheet or cross-reference \
             data between them (e.g., \"Join data from Sheet A and Sheet B\").",
            workbook.file_name,
            workbook.sheets.len(),
            sheet_names
        );

        self.workbook = Some(workbook);
        self.messages.clear();
        self.messages.push(ChatMessage {
            id: GREETING_ID.to_string(),
            role: Role::Model,
            content: greeting,
            timestamp: Utc::now().timestamp_millis(),
        });
        true
    }

    /// Ask a question and append both sides of the exchange.
    ///
    /// History sent upstream is every prior turn except the greeting. A
    /// backend failure is logged and turns into a model-authored apology
    /// message, keeping the conversation alive; the returned reference is
    /// the model message either way.
    pub fn ask(
        &mut self,
        question: &str,
        backend: &dyn AnalysisBackend,
    ) -> Result<&ChatMessage, SessionError> {
        let workbook = self.workbook.as_ref().ok_or(SessionError::NoWorkbook)?;
        let system_instruction = build_system_instruction(workbook);
        let history = self.history_turns();

        self.push_message(Role::User, question.to_string());

        let content = match backend.generate(&system_instruction, &history, question) {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY_FALLBACK.to_string(),
            Ok(text) => text,
            Err(e) => {
                log::error!("analysis request failed: {}", e);
                APOLOGY.to_string()
            }
        };

        Ok(self.push_message(Role::Model, content))
    }

    /// Prior turns in wire order, without the greeting.
    fn history_turns(&self) -> Vec<Turn> {
        self.messages
            .iter()
            .filter(|m| m.id != GREETING_ID)
            .map(|m| Turn {
                role: match m.role {
                    Role::User => TurnRole::User,
                    Role::Model => TurnRole::Model,
                },
                text: m.content.clone(),
            })
            .collect()
    }

    fn push_message(&mut self, role: Role, content: String) -> &ChatMessage {
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_id.to_string(),
            role,
            content,
            timestamp: Utc::now().timestamp_millis(),
        });
        self.messages.last().expect("message was just pushed")
    }
}
