//! GitHub gist client implementing [`RenderService`].

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::FixtureError;
use crate::service::{CreatedContainer, CreatedEntry, Credential, Entry, RenderService};

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const DESCRIPTION: &str = "gfm-fixtures scratch gist (safe to delete)";

/// Gist-backed rendering service.
pub struct GistClient {
    client: reqwest::Client,
    api: Url,
    token: Credential,
}

#[derive(Serialize)]
struct CreateGist<'a> {
    description: &'a str,
    public: bool,
    files: BTreeMap<&'a str, GistFileContent<'a>>,
}

#[derive(Serialize)]
struct GistFileContent<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct CreateComment<'a> {
    body: &'a str,
}

#[derive(Deserialize)]
struct GistResponse {
    id: Option<String>,
    html_url: Option<String>,
    files: Option<HashMap<String, Option<GistFile>>>,
}

#[derive(Deserialize)]
struct GistFile {
    filename: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<String>,
    truncated: Option<bool>,
}

impl From<GistResponse> for CreatedContainer {
    fn from(gist: GistResponse) -> Self {
        let entries = gist.files.map(|files| {
            files
                .into_iter()
                .map(|(key, file)| {
                    let file = file.unwrap_or(GistFile {
                        filename: None,
                        content_type: None,
                        truncated: None,
                    });
                    CreatedEntry {
                        name: file.filename.unwrap_or(key),
                        content_type: file.content_type,
                        truncated: file.truncated,
                    }
                })
                .collect()
        });
        CreatedContainer {
            id: gist.id,
            public_url: gist.html_url,
            entries,
        }
    }
}

impl GistClient {
    /// Default GitHub REST API root.
    pub const DEFAULT_API: &'static str = "https://api.github.com";

    /// Create a client for the API rooted at `api` (GitHub Enterprise roots
    /// such as `https://host/api/v3` work too).
    pub fn new(api: &str, token: Credential) -> Result<Self, FixtureError> {
        let mut api = Url::parse(api)?;
        if !api.path().ends_with('/') {
            let path = format!("{}/", api.path());
            api.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("gfm-fixtures/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, api, token })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FixtureError> {
        Ok(self.api.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.expose())
            .header(ACCEPT, ACCEPT_GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Turn a non-2xx response into `FixtureError::Server`.
    async fn check(resp: Response) -> Result<Response, FixtureError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FixtureError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl RenderService for GistClient {
    async fn create_container(&self, entries: &[Entry]) -> Result<CreatedContainer, FixtureError> {
        let url = self.endpoint("gists")?;
        let body = CreateGist {
            description: DESCRIPTION,
            public: false,
            files: entries
                .iter()
                .map(|entry| {
                    (
                        entry.name.as_str(),
                        GistFileContent {
                            content: &entry.content,
                        },
                    )
                })
                .collect(),
        };

        info!(url = %url, files = entries.len(), "creating gist");
        let resp = self.authorized(self.client.post(url)).json(&body).send().await?;
        let resp = Self::check(resp).await?;
        let gist: GistResponse = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(gist.into())
    }

    async fn post_comment(&self, id: &str, body: &str) -> Result<(), FixtureError> {
        let url = self.endpoint(&format!("gists/{id}/comments"))?;
        debug!(url = %url, bytes = body.len(), "posting gist comment");
        let resp = self
            .authorized(self.client.post(url))
            .json(&CreateComment { body })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<String, FixtureError> {
        let url = Url::parse(url)?;
        info!(url = %url, "fetching rendered gist");
        let resp = self.client.get(url).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.text().await?)
    }

    async fn delete_container(&self, id: &str) -> Result<(), FixtureError> {
        let url = self.endpoint(&format!("gists/{id}"))?;
        info!(url = %url, "deleting gist");
        let resp = self.authorized(self.client.delete(url)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
