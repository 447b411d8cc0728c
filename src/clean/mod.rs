// Cleaning rule registry.
//
// Every rule removes one kind of decoration GitHub adds when rendering
// markdown. The registry is a fixed enum in application order; configuration
// only decides which entries are active.

mod rules;

use std::fmt;
use std::str::FromStr;

use crate::tree::Fragment;

/// One structural rewrite over a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Drop `data-sourcepos`. Always active.
    PositionMarker,
    /// Drop `dir="auto"`.
    DirAuto,
    /// Replace the heading wrapper with the bare heading.
    HeadingAnchor,
    /// Drop `rel` from links marked `nofollow`.
    LinkNofollow,
    /// Restore the original URL of images behind the image proxy.
    CamoImage,
    /// Drop `style="max-width: 100%;"` from images.
    ImageMaxWidthStyle,
    /// Replace `<a target="_blank"><img></a>` with the image.
    ImageLink,
    /// Reduce user mention links to their `href`.
    UserMention,
    /// Unwrap issue links and drop issue/PR hovercard attributes.
    IssueLink,
    /// Unwrap `<g-emoji>`.
    Gemoji,
    /// Strip the per-render hash from footnote ids and hrefs. Always active.
    FootnoteIdHash,
    /// Drop task list classes and checkbox ids.
    TaskList,
    /// Unwrap the accessible table wrapper element.
    AccessibleTable,
    /// Drop the table rendered for YAML frontmatter.
    FrontmatterTable,
}

impl Rule {
    /// Every rule, in application order.
    pub const ALL: [Rule; 14] = [
        Rule::PositionMarker,
        Rule::DirAuto,
        Rule::HeadingAnchor,
        Rule::LinkNofollow,
        Rule::CamoImage,
        Rule::ImageMaxWidthStyle,
        Rule::ImageLink,
        Rule::UserMention,
        Rule::IssueLink,
        Rule::Gemoji,
        Rule::FootnoteIdHash,
        Rule::TaskList,
        Rule::AccessibleTable,
        Rule::FrontmatterTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::PositionMarker => "strip-position-marker",
            Rule::DirAuto => "strip-dir-auto",
            Rule::HeadingAnchor => "unwrap-heading-anchor",
            Rule::LinkNofollow => "strip-link-nofollow",
            Rule::CamoImage => "unwrap-camo-image",
            Rule::ImageMaxWidthStyle => "strip-image-max-width-style",
            Rule::ImageLink => "unwrap-image-link",
            Rule::UserMention => "strip-user-mention",
            Rule::IssueLink => "strip-issue-link",
            Rule::Gemoji => "unwrap-gemoji",
            Rule::FootnoteIdHash => "strip-footnote-id-hash",
            Rule::TaskList => "strip-tasklist-decoration",
            Rule::AccessibleTable => "unwrap-accessible-table",
            Rule::FrontmatterTable => "strip-frontmatter-table",
        }
    }

    /// The keep toggle that suppresses this rule, if any.
    pub fn toggle(self) -> Option<KeepToggle> {
        match self {
            Rule::PositionMarker | Rule::FootnoteIdHash => None,
            Rule::DirAuto => Some(KeepToggle::Dir),
            Rule::HeadingAnchor => Some(KeepToggle::Heading),
            Rule::LinkNofollow => Some(KeepToggle::Link),
            Rule::CamoImage => Some(KeepToggle::Camo),
            Rule::ImageMaxWidthStyle | Rule::ImageLink => Some(KeepToggle::Image),
            Rule::UserMention => Some(KeepToggle::Mention),
            Rule::IssueLink => Some(KeepToggle::Issue),
            Rule::Gemoji => Some(KeepToggle::Gemoji),
            Rule::TaskList => Some(KeepToggle::Tasklist),
            Rule::AccessibleTable => Some(KeepToggle::Table),
            Rule::FrontmatterTable => Some(KeepToggle::Frontmatter),
        }
    }

    pub fn is_active(self, keep: &Keep) -> bool {
        self.toggle().map_or(true, |toggle| !keep.is_set(toggle))
    }

    /// Run this rule once over a fragment.
    pub fn apply(self, fragment: &Fragment) {
        let root = fragment.root();
        match self {
            Rule::PositionMarker => rules::strip_position_marker(root),
            Rule::DirAuto => rules::strip_dir_auto(root),
            Rule::HeadingAnchor => rules::unwrap_heading_anchor(root),
            Rule::LinkNofollow => rules::strip_link_nofollow(root),
            Rule::CamoImage => rules::unwrap_camo_image(root),
            Rule::ImageMaxWidthStyle => rules::strip_image_max_width_style(root),
            Rule::ImageLink => rules::unwrap_image_link(root),
            Rule::UserMention => rules::strip_user_mention(root),
            Rule::IssueLink => rules::strip_issue_link(root),
            Rule::Gemoji => rules::unwrap_gemoji(root),
            Rule::FootnoteIdHash => rules::strip_footnote_id_hash(root),
            Rule::TaskList => rules::strip_tasklist_decoration(root),
            Rule::AccessibleTable => rules::unwrap_accessible_table(root),
            Rule::FrontmatterTable => rules::strip_frontmatter_table(root),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named switch that keeps one kind of GitHub decoration in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeepToggle {
    Camo,
    Dir,
    Frontmatter,
    Gemoji,
    Heading,
    Image,
    Issue,
    Link,
    Mention,
    Table,
    Tasklist,
}

impl KeepToggle {
    pub const ALL: [KeepToggle; 11] = [
        KeepToggle::Camo,
        KeepToggle::Dir,
        KeepToggle::Frontmatter,
        KeepToggle::Gemoji,
        KeepToggle::Heading,
        KeepToggle::Image,
        KeepToggle::Issue,
        KeepToggle::Link,
        KeepToggle::Mention,
        KeepToggle::Table,
        KeepToggle::Tasklist,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KeepToggle::Camo => "camo",
            KeepToggle::Dir => "dir",
            KeepToggle::Frontmatter => "frontmatter",
            KeepToggle::Gemoji => "gemoji",
            KeepToggle::Heading => "heading",
            KeepToggle::Image => "image",
            KeepToggle::Issue => "issue",
            KeepToggle::Link => "link",
            KeepToggle::Mention => "mention",
            KeepToggle::Table => "table",
            KeepToggle::Tasklist => "tasklist",
        }
    }
}

impl fmt::Display for KeepToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a keep toggle name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown keep toggle `{0}` (expected one of: camo, dir, frontmatter, gemoji, heading, image, issue, link, mention, table, tasklist)")]
pub struct UnknownToggle(pub String);

impl FromStr for KeepToggle {
    type Err = UnknownToggle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeepToggle::ALL
            .into_iter()
            .find(|toggle| toggle.name() == s)
            .ok_or_else(|| UnknownToggle(s.to_string()))
    }
}

/// Keep toggles. Unset (the default) means the matching rule runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keep {
    pub camo: bool,
    pub dir: bool,
    pub frontmatter: bool,
    pub gemoji: bool,
    pub heading: bool,
    pub image: bool,
    pub issue: bool,
    pub link: bool,
    pub mention: bool,
    pub table: bool,
    pub tasklist: bool,
}

impl Keep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one toggle.
    pub fn with(mut self, toggle: KeepToggle) -> Self {
        *self.slot(toggle) = true;
        self
    }

    pub fn is_set(&self, toggle: KeepToggle) -> bool {
        match toggle {
            KeepToggle::Camo => self.camo,
            KeepToggle::Dir => self.dir,
            KeepToggle::Frontmatter => self.frontmatter,
            KeepToggle::Gemoji => self.gemoji,
            KeepToggle::Heading => self.heading,
            KeepToggle::Image => self.image,
            KeepToggle::Issue => self.issue,
            KeepToggle::Link => self.link,
            KeepToggle::Mention => self.mention,
            KeepToggle::Table => self.table,
            KeepToggle::Tasklist => self.tasklist,
        }
    }

    fn slot(&mut self, toggle: KeepToggle) -> &mut bool {
        match toggle {
            KeepToggle::Camo => &mut self.camo,
            KeepToggle::Dir => &mut self.dir,
            KeepToggle::Frontmatter => &mut self.frontmatter,
            KeepToggle::Gemoji => &mut self.gemoji,
            KeepToggle::Heading => &mut self.heading,
            KeepToggle::Image => &mut self.image,
            KeepToggle::Issue => &mut self.issue,
            KeepToggle::Link => &mut self.link,
            KeepToggle::Mention => &mut self.mention,
            KeepToggle::Table => &mut self.table,
            KeepToggle::Tasklist => &mut self.tasklist,
        }
    }
}

impl FromIterator<KeepToggle> for Keep {
    fn from_iter<I: IntoIterator<Item = KeepToggle>>(iter: I) -> Self {
        iter.into_iter().fold(Keep::default(), Keep::with)
    }
}

/// The ordered list of active rules for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    rules: Vec<Rule>,
}

impl Pipeline {
    pub fn new(keep: &Keep) -> Self {
        let rules = Rule::ALL
            .into_iter()
            .filter(|rule| rule.is_active(keep))
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Apply every active rule, in order, to one fragment.
    pub fn run(&self, fragment: &Fragment) {
        for rule in &self.rules {
            tracing::trace!(rule = %rule, "applying cleaning rule");
            rule.apply(fragment);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&Keep::default())
    }
}
