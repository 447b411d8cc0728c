use std::path::PathBuf;

/// Errors that can occur while generating fixtures.
///
/// Every variant is fatal for the whole batch. There is no partial-success mode.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FixtureError {
    #[error("missing GitHub token (set GH_TOKEN or GITHUB_TOKEN)")]
    MissingCredential,

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Remote-contract violations. These usually mean the submitted markdown
    // contained raw control characters or lone surrogates.
    #[error("created container is missing `{0}`")]
    MissingField(&'static str),

    #[error("created container has no entry named `{0}`")]
    MissingEntry(String),

    #[error("entry `{entry}` was classified as `{content_type}`, expected markdown or plain text (control characters in the source?)")]
    UnexpectedContentType { entry: String, content_type: String },

    #[error("entry `{entry}` was truncated")]
    Truncated { entry: String },

    #[error("file container has no name")]
    MissingSlotName,

    #[error("file container name `{0}` does not match `slot-<n>`")]
    SlotName(String),

    #[error("slot {index} is out of range ({expected} file sources submitted)")]
    SlotOutOfRange { index: usize, expected: usize },

    #[error("slot {0} appears more than once in the rendered document")]
    DuplicateSlot(usize),

    #[error("slot {0} was not found in the rendered document")]
    MissingSlot(usize),

    #[error("{0} container has no rendered body")]
    MissingBody(&'static str),

    #[error("expected {expected} rendered comments, found {found}")]
    CommentCount { expected: usize, found: usize },
}

impl FixtureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
