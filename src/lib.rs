// gfm-fixtures: reference HTML for markdown, rendered by GitHub and cleaned.
//
// Architecture:
//   *.md → intake → gist (files + comments) → rendered page → extract →
//   one fragment per source → clean (rule pipeline) → stringify → *.html
//
// GitHub decorates its output (anchors, proxied images, task list classes,
// per-render footnote hashes, …). The cleaning rules remove exactly that
// decoration so the result approximates a plain markdown-to-HTML transform.

mod error;
pub mod clean;
pub mod extract;
pub mod gist;
pub mod intake;
pub mod orchestrate;
pub mod service;
mod stringify;
mod tree;

pub use clean::{Keep, KeepToggle, Pipeline, Rule, UnknownToggle};
pub use error::FixtureError;
pub use gist::GistClient;
pub use intake::{Decision, MarkdownSource, Mode, SourceMeta};
pub use orchestrate::{generate, Correlation, RenderBatch, Report, Slot};
pub use service::{Credential, RenderService};
pub use stringify::{stringify, to_artifact, StringifyOptions};
pub use tree::Fragment;

/// Generation options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Which decorations to keep (each one disables a cleaning rule).
    pub keep: Keep,
    /// Turn Control Pictures into the control characters they stand for
    /// before submitting.
    pub control_pictures: bool,
    /// Regenerate outputs that already exist.
    pub regenerate: bool,
    /// Serializer formatting options.
    pub stringify: StringifyOptions,
}

impl Config {
    /// Create a new Config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep one kind of decoration.
    pub fn with_keep(mut self, toggle: KeepToggle) -> Self {
        self.keep = self.keep.with(toggle);
        self
    }

    /// Set whether control characters are substituted before submitting.
    pub fn with_control_pictures(mut self, enabled: bool) -> Self {
        self.control_pictures = enabled;
        self
    }

    /// Set whether existing outputs are regenerated.
    pub fn with_regenerate(mut self, regenerate: bool) -> Self {
        self.regenerate = regenerate;
        self
    }

    /// Set the attribute quote character.
    pub fn with_quote(mut self, quote: char) -> Self {
        self.stringify.quote = quote;
        self
    }

    /// Set whether empty attributes are printed as bare names.
    pub fn with_collapse_empty_attributes(mut self, collapse: bool) -> Self {
        self.stringify.collapse_empty_attributes = collapse;
        self
    }

    /// Set whether void elements are closed XML-style.
    pub fn with_close_self_closing(mut self, close: bool) -> Self {
        self.stringify.close_self_closing = close;
        self
    }
}

/// Clean one rendered fragment using default options.
///
/// # Examples
///
/// ```
/// let html = gfm_fixtures::clean(r#"<p dir="auto">Hello</p>"#);
/// assert_eq!(html, "<p>Hello</p>\n");
/// ```
pub fn clean(html: &str) -> String {
    clean_with(html, &Config::default())
}

/// Clean one rendered fragment with custom options.
///
/// # Examples
///
/// ```
/// use gfm_fixtures::{clean_with, Config, KeepToggle};
///
/// let config = Config::new().with_keep(KeepToggle::Dir);
/// let html = clean_with(r#"<p dir="auto">Hello</p>"#, &config);
/// assert_eq!(html, "<p dir=\"auto\">Hello</p>\n");
/// ```
pub fn clean_with(html: &str, config: &Config) -> String {
    let fragment = Fragment::parse(html);
    Pipeline::new(&config.keep).run(&fragment);
    to_artifact(&fragment, &config.stringify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_clean_heading() {
        let html = concat!(
            r#"<div class="markdown-heading" dir="auto"><h1 class="heading-element" dir="auto">hi</h1>"#,
            r##"<a id="user-content-hi" class="anchor" aria-label="Permalink: hi" href="#hi"><svg class="octicon octicon-link" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="m7.775 3.275"></path></svg></a></div>"##,
        );
        assert_eq!(clean(html), "<h1>hi</h1>\n");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::new()
            .with_keep(KeepToggle::Camo)
            .with_keep(KeepToggle::Image)
            .with_control_pictures(true)
            .with_quote('\'');

        assert!(config.keep.camo);
        assert!(config.keep.image);
        assert!(!config.keep.dir);
        assert!(config.control_pictures);
        assert!(!config.regenerate);
        assert_eq!(config.stringify.quote, '\'');
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.keep, Keep::default());
        assert!(!config.control_pictures);
        assert!(!config.regenerate);
        assert_eq!(config.stringify.quote, '"');
        assert!(!config.stringify.collapse_empty_attributes);
    }
}
