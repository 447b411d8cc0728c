// Source intake: find markdown files, classify them, and decide which ones
// take part in this run.
//
// Naming convention: `<name>.<mode>.md`, where `<mode>` is `comment` for
// comment-mode sources and anything else (or nothing) for file mode. Any
// dot-separated segment equal to `offline` keeps the file out of the run.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use walkdir::WalkDir;

use crate::error::FixtureError;

/// How a source is submitted for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rendered as a named file in the gist.
    File,
    /// Rendered as a comment on the gist (line breaks become `<br>`).
    Comment,
}

/// Everything known about a source before reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    pub path: PathBuf,
    /// Where the cleaned HTML goes: `path` with an `.html` extension.
    pub output: PathBuf,
    pub mode: Mode,
    pub offline: bool,
}

impl SourceMeta {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let segments: Vec<&str> = stem.split('.').collect();
        let mode = match segments.last() {
            Some(&"comment") => Mode::Comment,
            _ => Mode::File,
        };
        let offline = segments.contains(&"offline");
        let output = path.with_extension("html");
        Self {
            path,
            output,
            mode,
            offline,
        }
    }

    /// Decide whether this source is rendered in this run.
    pub fn decide(&self, regenerate: bool) -> Decision {
        if self.offline {
            Decision::Offline
        } else if regenerate || !self.output.exists() {
            Decision::Generate
        } else {
            Decision::UpToDate
        }
    }
}

/// Per-source generation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Generate,
    /// Marked offline; never submitted, never written.
    Offline,
    /// Output exists and regeneration was not forced.
    UpToDate,
}

impl Decision {
    pub fn generate(self) -> bool {
        self == Decision::Generate
    }
}

/// A source selected for rendering, with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSource {
    pub meta: SourceMeta,
    pub content: String,
}

/// Recursively find `*.md` files below `root`, sorted by path.
pub fn discover(root: &Path) -> Result<Vec<SourceMeta>, FixtureError> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let is_markdown = entry.path().extension().is_some_and(|ext| ext == "md");
        if entry.file_type().is_file() && is_markdown {
            sources.push(SourceMeta::from_path(entry.into_path()));
        }
    }
    tracing::debug!(root = %root.display(), count = sources.len(), "discovered markdown sources");
    Ok(sources)
}

/// Read source contents concurrently. Order is preserved.
pub async fn read_sources(metas: Vec<SourceMeta>) -> Result<Vec<MarkdownSource>, FixtureError> {
    try_join_all(metas.into_iter().map(|meta| async move {
        let content = tokio::fs::read_to_string(&meta.path)
            .await
            .map_err(|error| FixtureError::io(&meta.path, error))?;
        Ok::<_, FixtureError>(MarkdownSource { meta, content })
    }))
    .await
}

/// Replace Control Pictures (U+2400 to U+2421) with the control characters
/// they stand for, so sources can carry characters like `\t`, `\r` or BEL
/// without embedding them raw.
pub fn control_pictures(value: &str) -> Cow<'_, str> {
    fn control(c: char) -> Option<char> {
        match c {
            '\u{2400}'..='\u{2420}' => char::from_u32(c as u32 - 0x2400),
            '\u{2421}' => Some('\x7f'),
            _ => None,
        }
    }

    if !value.chars().any(|c| control(c).is_some()) {
        return Cow::Borrowed(value);
    }
    value.chars().map(|c| control(c).unwrap_or(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_last_segment() {
        assert_eq!(SourceMeta::from_path("a/b.md").mode, Mode::File);
        assert_eq!(SourceMeta::from_path("a/b.file.md").mode, Mode::File);
        assert_eq!(SourceMeta::from_path("a/b.comment.md").mode, Mode::Comment);
        assert_eq!(SourceMeta::from_path("a/b.comment.x.md").mode, Mode::File);
        assert_eq!(SourceMeta::from_path("a/comment.md").mode, Mode::Comment);
    }

    #[test]
    fn offline_from_any_segment() {
        assert!(SourceMeta::from_path("b.offline.comment.md").offline);
        assert!(SourceMeta::from_path("offline.md").offline);
        assert!(!SourceMeta::from_path("b.offlines.md").offline);
    }

    #[test]
    fn output_path_swaps_extension() {
        let meta = SourceMeta::from_path("fixtures/x.comment.md");
        assert_eq!(meta.output, PathBuf::from("fixtures/x.comment.html"));
    }

    #[test]
    fn offline_is_never_generated() {
        let meta = SourceMeta::from_path("/nonexistent/dir/x.offline.md");
        assert_eq!(meta.decide(false), Decision::Offline);
        assert_eq!(meta.decide(true), Decision::Offline);
    }

    #[test]
    fn missing_output_is_generated() {
        let meta = SourceMeta::from_path("/nonexistent/dir/x.md");
        assert_eq!(meta.decide(false), Decision::Generate);
    }

    #[test]
    fn control_pictures_substitution() {
        assert_eq!(control_pictures("a\u{2409}b\tc"), "a\tb\tc");
        assert_eq!(control_pictures("\u{240d}\u{240a}"), "\r\n");
        assert_eq!(
            control_pictures("a\u{2400}b\u{241b}c\u{2420}d\u{2421}"),
            "a\u{0}b\u{1b}c d\u{7f}"
        );
        assert!(matches!(control_pictures("plain\t\u{7}"), Cow::Borrowed(_)));
        // Outside the block.
        assert_eq!(control_pictures("\u{2422}\u{23ff}"), "\u{2422}\u{23ff}");
    }
}
