//! sheetchat-core: chat-with-your-spreadsheet analysis library
//!
//! Turns a spreadsheet (local bytes or a Google Sheet id) into an in-memory
//! [`Workbook`], serializes a bounded context snapshot of it into an LLM
//! prompt, runs the question/answer cycle against the Gemini endpoint and
//! decodes chart directives embedded in replies. All conversation state
//! lives in a [`Session`] and only for the life of the process.

pub mod analysis;
pub mod config;
pub mod context;
pub mod decode;
pub mod error;
pub mod ingest;
pub mod prompt;
pub mod session;

pub use analysis::{AnalysisBackend, GeminiBackend, Turn, TurnRole};
pub use config::ChatConfig;
pub use context::{format_workbook_context, MAX_PREVIEW_ROWS};
pub use decode::{decode_reply, ChartDataPoint, ChartSpec, ChartType, DecodedReply};
pub use error::{AnalysisError, IngestError, SessionError};
pub use ingest::{
    extract_sheet_id, fetch_google_sheet, parse_workbook, CellScalar, Row, Sheet, Workbook,
};
pub use prompt::build_system_instruction;
pub use session::{ChatMessage, Generation, Role, Session, GREETING_ID};
