// Render orchestration: submit a batch, fetch the rendered page, and turn it
// into one cleaned artifact per source.
//
// Each source gets a `Correlation` once, when the batch is built. Extraction
// and writing look fragments up through it; nothing is recounted later.
//
// Container creation and comment posting are strictly sequential: comment
// renderings are matched to sources purely by their position on the page.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::clean::Pipeline;
use crate::error::FixtureError;
use crate::extract::{extract, slot_filename, Layout};
use crate::intake::{control_pictures, discover, read_sources, Decision, MarkdownSource, Mode};
use crate::service::{CreatedContainer, Entry, RenderService};
use crate::stringify::to_artifact;
use crate::tree::Fragment;
use crate::Config;

const PLACEHOLDER_CONTENT: &str = "placeholder\n";

/// Where a source's rendering lives in the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// File entry `slot-<n>.md`.
    File(usize),
    /// The nth comment posted.
    Comment(usize),
}

/// Ties a source (by batch index) to its place in the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correlation {
    pub source_index: usize,
    pub slot: Slot,
}

/// The sources submitted together in one container.
#[derive(Debug, Clone)]
pub struct RenderBatch {
    sources: Vec<MarkdownSource>,
    correlations: Vec<Correlation>,
    slots: usize,
    comments: usize,
    control_pictures: bool,
}

impl RenderBatch {
    pub fn new(sources: Vec<MarkdownSource>, control_pictures: bool) -> Self {
        let mut slots = 0;
        let mut comments = 0;
        let correlations = sources
            .iter()
            .enumerate()
            .map(|(source_index, source)| {
                let slot = match source.meta.mode {
                    Mode::File => {
                        slots += 1;
                        Slot::File(slots - 1)
                    }
                    Mode::Comment => {
                        comments += 1;
                        Slot::Comment(comments - 1)
                    }
                };
                Correlation { source_index, slot }
            })
            .collect();
        Self {
            sources,
            correlations,
            slots,
            comments,
            control_pictures,
        }
    }

    pub fn sources(&self) -> &[MarkdownSource] {
        &self.sources
    }

    pub fn correlations(&self) -> &[Correlation] {
        &self.correlations
    }

    /// Shape of the container, for the extractor.
    pub fn layout(&self) -> Layout {
        Layout {
            slots: self.slots,
            comments: self.comments,
            placeholder: self.slots == 0,
        }
    }

    /// Content as submitted, after optional control-picture substitution.
    fn submitted<'a>(&self, source: &'a MarkdownSource) -> Cow<'a, str> {
        if self.control_pictures {
            control_pictures(&source.content)
        } else {
            Cow::Borrowed(&source.content)
        }
    }

    /// Named entries for the container. Never empty.
    pub fn entries(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .correlations
            .iter()
            .filter_map(|correlation| match correlation.slot {
                Slot::File(index) => Some(Entry {
                    name: slot_filename(index),
                    content: self.submitted(&self.sources[correlation.source_index]).into_owned(),
                }),
                Slot::Comment(_) => None,
            })
            .collect();
        if entries.is_empty() {
            entries.push(Entry {
                name: slot_filename(0),
                content: PLACEHOLDER_CONTENT.to_string(),
            });
        }
        entries
    }

    /// Comment bodies in posting order.
    pub fn comment_bodies(&self) -> Vec<Cow<'_, str>> {
        self.correlations
            .iter()
            .filter(|correlation| matches!(correlation.slot, Slot::Comment(_)))
            .map(|correlation| self.submitted(&self.sources[correlation.source_index]))
            .collect()
    }
}

/// A created container that passed validation.
#[derive(Debug)]
struct Container {
    public_url: String,
}

fn is_text_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("text/markdown") || essence.eq_ignore_ascii_case("text/plain")
}

/// Check the created container against what was submitted.
fn validate(created: CreatedContainer, submitted: &[Entry]) -> Result<Container, FixtureError> {
    let entries = created.entries.ok_or(FixtureError::MissingField("files"))?;
    let public_url = created.public_url.ok_or(FixtureError::MissingField("html_url"))?;
    created.id.ok_or(FixtureError::MissingField("id"))?;

    for expected in submitted {
        let entry = entries
            .iter()
            .find(|entry| entry.name == expected.name)
            .ok_or_else(|| FixtureError::MissingEntry(expected.name.clone()))?;
        let content_type = entry
            .content_type
            .as_deref()
            .ok_or(FixtureError::MissingField("type"))?;
        if !is_text_type(content_type) {
            return Err(FixtureError::UnexpectedContentType {
                entry: entry.name.clone(),
                content_type: content_type.to_string(),
            });
        }
        if entry.truncated.ok_or(FixtureError::MissingField("truncated"))? {
            return Err(FixtureError::Truncated {
                entry: entry.name.clone(),
            });
        }
    }
    Ok(Container { public_url })
}

/// Submit a batch and return the rendered page.
///
/// Once the container exists it is deleted again, whether or not the later
/// steps succeed.
pub async fn render<S>(service: &S, batch: &RenderBatch) -> Result<String, FixtureError>
where
    S: RenderService + ?Sized,
{
    let entries = batch.entries();
    let created = service.create_container(&entries).await?;
    let id = created.id.clone().ok_or(FixtureError::MissingField("id"))?;
    info!(id = %id, files = entries.len(), "created container");

    let result = post_and_fetch(service, batch, &id, created, &entries).await;

    if let Err(error) = service.delete_container(&id).await {
        warn!(id = %id, error = %error, "failed to delete container");
    }
    result
}

async fn post_and_fetch<S>(
    service: &S,
    batch: &RenderBatch,
    id: &str,
    created: CreatedContainer,
    entries: &[Entry],
) -> Result<String, FixtureError>
where
    S: RenderService + ?Sized,
{
    let container = validate(created, entries)?;

    // One at a time: the page lists comments in arrival order.
    let bodies = batch.comment_bodies();
    for (ordinal, body) in bodies.iter().enumerate() {
        debug!(ordinal, "posting comment");
        service.post_comment(id, body).await?;
    }

    service.fetch(&container.public_url).await
}

/// Extract, clean and serialize every source's fragment. Returns
/// `(output path, html)` in batch order.
pub fn build_artifacts(
    document: &str,
    batch: &RenderBatch,
    config: &Config,
) -> Result<Vec<(PathBuf, String)>, FixtureError> {
    let extracted = extract(document, &batch.layout())?;
    let mut files: Vec<Option<Fragment>> = extracted.files.into_iter().map(Some).collect();
    let mut comments: Vec<Option<Fragment>> = extracted.comments.into_iter().map(Some).collect();
    let pipeline = Pipeline::new(&config.keep);

    batch
        .correlations()
        .iter()
        .map(|correlation| {
            let fragment = match correlation.slot {
                Slot::File(index) => files.get_mut(index).and_then(Option::take),
                Slot::Comment(ordinal) => comments.get_mut(ordinal).and_then(Option::take),
            };
            let fragment = fragment.ok_or(match correlation.slot {
                Slot::File(index) => FixtureError::MissingSlot(index),
                Slot::Comment(_) => FixtureError::MissingBody("comment"),
            })?;
            pipeline.run(&fragment);
            let source = &batch.sources()[correlation.source_index];
            debug!(
                path = %source.meta.path.display(),
                slot = ?correlation.slot,
                "cleaned fragment"
            );
            Ok((source.meta.output.clone(), to_artifact(&fragment, &config.stringify)))
        })
        .collect()
}

/// Write artifacts concurrently.
async fn write_artifacts(artifacts: Vec<(PathBuf, String)>) -> Result<Vec<PathBuf>, FixtureError> {
    try_join_all(artifacts.into_iter().map(|(path, html)| async move {
        tokio::fs::write(&path, html)
            .await
            .map_err(|error| FixtureError::io(&path, error))?;
        Ok::<_, FixtureError>(path)
    }))
    .await
}

/// Outcome of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Outputs written, in batch order.
    pub generated: Vec<PathBuf>,
    /// Sources whose output already existed.
    pub up_to_date: usize,
    /// Sources marked offline.
    pub offline: usize,
}

/// Discover sources under `root`, render the ones that need it, and write
/// their cleaned HTML next to them.
///
/// Nothing is written unless every eligible source rendered and extracted
/// cleanly.
pub async fn generate<S>(root: &Path, config: &Config, service: &S) -> Result<Report, FixtureError>
where
    S: RenderService + ?Sized,
{
    let mut report = Report::default();
    let mut eligible = Vec::new();
    for meta in discover(root)? {
        match meta.decide(config.regenerate) {
            Decision::Generate => eligible.push(meta),
            Decision::Offline => report.offline += 1,
            Decision::UpToDate => report.up_to_date += 1,
        }
    }
    info!(
        generate = eligible.len(),
        up_to_date = report.up_to_date,
        offline = report.offline,
        "collected sources"
    );
    if eligible.is_empty() {
        return Ok(report);
    }

    let batch = RenderBatch::new(read_sources(eligible).await?, config.control_pictures);
    let document = render(service, &batch).await?;
    let artifacts = build_artifacts(&document, &batch, config)?;
    report.generated = write_artifacts(artifacts).await?;
    info!(written = report.generated.len(), "wrote fixtures");
    Ok(report)
}
