use std::path::PathBuf;

use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::Parser;
use gfm_fixtures::{generate, Config, Credential, GistClient, Keep, KeepToggle, StringifyOptions};
use tracing_subscriber::EnvFilter;

/// Render markdown fixtures through GitHub gists and write cleaned HTML next
/// to each source.
#[derive(Debug, Parser)]
#[command(name = "gfm-fixtures", version)]
struct Cli {
    /// Directory searched (recursively) for `*.md` sources.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Keep one kind of GitHub decoration: camo, dir, frontmatter, gemoji,
    /// heading, image, issue, link, mention, table, tasklist.
    #[arg(long = "keep", value_name = "TOGGLE")]
    keep: Vec<KeepToggle>,

    /// Turn Control Pictures (U+2400 to U+2421) into the control characters
    /// they stand for before submitting.
    #[arg(long)]
    control_pictures: bool,

    /// Regenerate outputs that already exist.
    #[arg(
        long,
        env = "UPDATE",
        default_value_t = false,
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    regenerate: bool,

    /// GitHub REST API root.
    #[arg(long, default_value = GistClient::DEFAULT_API)]
    api_url: String,

    /// Print every empty attribute as a bare name.
    #[arg(long)]
    collapse_empty_attributes: bool,

    /// Close void elements XML-style (`<br />`).
    #[arg(long)]
    close_self_closing: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            keep: self.keep.iter().copied().collect::<Keep>(),
            control_pictures: self.control_pictures,
            regenerate: self.regenerate,
            stringify: StringifyOptions {
                collapse_empty_attributes: self.collapse_empty_attributes,
                close_self_closing: self.close_self_closing,
                ..StringifyOptions::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let token = Credential::from_env()?;
    let service = GistClient::new(&cli.api_url, token).context("failed to set up GitHub client")?;

    let report = generate(&cli.root, &cli.config(), &service)
        .await
        .with_context(|| format!("failed to generate fixtures under {}", cli.root.display()))?;

    tracing::info!(
        generated = report.generated.len(),
        up_to_date = report.up_to_date,
        offline = report.offline,
        "done"
    );
    Ok(())
}
