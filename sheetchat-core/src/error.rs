//! Error taxonomy for ingestion and analysis

use thiserror::Error;

/// Errors raised while turning raw spreadsheet input into a [`Workbook`].
///
/// Each variant maps to one user action failure and carries internal detail
/// for logging; [`IngestError::user_message`] is what the user actually sees.
///
/// [`Workbook`]: crate::ingest::Workbook
#[derive(Debug, Error)]
pub enum IngestError {
    /// The bytes were not a readable spreadsheet container.
    #[error("spreadsheet bytes could not be parsed: {0}")]
    Parse(String),

    /// Every sheet in the workbook was empty after normalization.
    #[error("workbook has no sheets with data")]
    EmptyWorkbook,

    /// The remote export could not be retrieved (HTTP status or transport).
    #[error("remote sheet fetch failed: {0}")]
    Fetch(String),

    /// No spreadsheet id could be extracted from the given string.
    #[error("could not find a spreadsheet id in {0:?}")]
    BadIdentifier(String),
}

impl IngestError {
    /// Short, displayable message with no internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            IngestError::Parse(_) => {
                "Failed to parse the spreadsheet. Please check the file and try again."
            }
            IngestError::EmptyWorkbook => {
                "The spreadsheet appears to be empty or has no readable data."
            }
            IngestError::Fetch(_) => {
                "Could not connect to the Google Sheet. Please check permissions \
                 (must be 'Anyone with the link') or the URL."
            }
            IngestError::BadIdentifier(_) => "Invalid Google Sheet URL or ID.",
        }
    }
}

/// The LLM call failed or returned unusable content.
///
/// The detail string is for logs; callers show a generic message and keep
/// the conversation going (see [`Session::ask`]).
///
/// [`Session::ask`]: crate::session::Session::ask
#[derive(Debug, Error)]
#[error("analysis request failed: {detail}")]
pub struct AnalysisError {
    pub(crate) detail: String,
}

impl AnalysisError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        "Analysis failed. Please try again."
    }
}

/// Misuse of the session API rather than an external failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A question was asked before any workbook was installed.
    #[error("no workbook loaded")]
    NoWorkbook,
}
