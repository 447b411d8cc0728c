// The remote rendering service seam.
//
// The orchestrator only talks to `RenderService`; `GistClient` is the real
// implementation and tests plug in an in-memory one.

use std::fmt;

use async_trait::async_trait;

use crate::error::FixtureError;

/// A named text entry submitted when creating a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub content: String,
}

/// What the service reports about a freshly created container.
///
/// Every field the orchestrator relies on is optional here so that a response
/// missing it is caught by validation rather than by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedContainer {
    pub id: Option<String>,
    pub public_url: Option<String>,
    pub entries: Option<Vec<CreatedEntry>>,
}

/// Per-entry metadata of a created container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEntry {
    pub name: String,
    /// Detected MIME type, e.g. `text/markdown`.
    pub content_type: Option<String>,
    pub truncated: Option<bool>,
}

/// A service that renders markdown inside a container holding named entries
/// and an appendable comment thread.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn create_container(&self, entries: &[Entry]) -> Result<CreatedContainer, FixtureError>;

    /// Append a comment. Must not return before the comment is stored.
    async fn post_comment(&self, id: &str, body: &str) -> Result<(), FixtureError>;

    /// Fetch the rendered page of a container.
    async fn fetch(&self, url: &str) -> Result<String, FixtureError>;

    async fn delete_container(&self, id: &str) -> Result<(), FixtureError>;
}

/// Bearer token for the rendering service.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Environment variables checked, in order.
    pub const VARIABLES: [&'static str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read the token from `GH_TOKEN`, falling back to `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self, FixtureError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FixtureError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::VARIABLES
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|token| !token.trim().is_empty())
            .map(Self)
            .ok_or(FixtureError::MissingCredential)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
