// Rule bodies. Each function is one pass over a fragment root.
//
// Match predicates are deliberately narrow: they target markup GitHub adds
// around rendered markdown, and must not touch HTML authored in the source.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;
use regex::Regex;

use crate::tree::{
    get_attr, has_attr, has_class, insert_attr, is_element, is_text, parent, remove_attr,
    remove_child, remove_class, retain_attrs, set_attr, tag_name, walk, Visit,
};

const POSITION_ATTRIBUTE: &str = "data-sourcepos";
const CANONICAL_SRC_ATTRIBUTE: &str = "data-canonical-src";
const HEADING_WRAPPER_CLASS: &str = "markdown-heading";
const HEADING_CLASS: &str = "heading-element";
const ANCHOR_CLASS: &str = "anchor";
const USER_MENTION_CLASS: &str = "user-mention";
const ISSUE_LINK_CLASS: &str = "issue-link";
const HOVERCARD_TYPE_ATTRIBUTE: &str = "data-hovercard-type";
const HOVERCARD_URL_ATTRIBUTE: &str = "data-hovercard-url";
const EMOJI_ELEMENT: &str = "g-emoji";
const FOOTNOTE_REF_ATTRIBUTE: &str = "data-footnote-ref";
const FOOTNOTE_BACKREF_CLASS: &str = "data-footnote-backref";
const FOOTNOTE_ID_PREFIX: &str = "user-content-fn-";
const TASK_LIST_CLASS: &str = "contains-task-list";
const TASK_LIST_ITEM_CLASS: &str = "task-list-item";
const TASK_LIST_CHECKBOX_CLASS: &str = "task-list-item-checkbox";
// GitHub ships the misspelled name; accept the correct one as well.
const TABLE_WRAPPERS: &[&str] = &["markdown-accessiblity-table", "markdown-accessibility-table"];
const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const TABLE_TYPE_ATTRIBUTE: &str = "data-table-type";
const FRONTMATTER_TABLE_TYPE: &str = "yaml-metadata";

static FOOTNOTE_HASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-[0-9a-f]{32}$").unwrap());
static MAX_WIDTH_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^max-width:100%;?$").unwrap());

/// Apply `f` to every element below `root`, never restructuring the tree.
fn for_each_element<F>(root: &Handle, mut f: F)
where
    F: FnMut(&Handle),
{
    walk(root, &mut |node| {
        if tag_name(node).is_some() {
            f(node);
        }
        Visit::Continue
    });
}

pub(crate) fn strip_position_marker(root: &Handle) {
    for_each_element(root, |node| remove_attr(node, POSITION_ATTRIBUTE));
}

pub(crate) fn strip_dir_auto(root: &Handle) {
    for_each_element(root, |node| {
        if get_attr(node, "dir").as_deref() == Some("auto") {
            remove_attr(node, "dir");
        }
    });
}

/// `<div class="markdown-heading"><h1 class="heading-element">…</h1><a class="anchor">…</a></div>`
/// becomes `<h1>…</h1>`. Anything after the anchor goes with the wrapper.
pub(crate) fn unwrap_heading_anchor(root: &Handle) {
    walk(root, &mut |node| {
        if !has_class(node, HEADING_WRAPPER_CLASS) {
            return Visit::Continue;
        }
        let children = node.children.borrow().clone();
        let [heading, anchor, ..] = children.as_slice() else {
            return Visit::Continue;
        };
        let is_heading = tag_name(heading).is_some_and(|tag| HEADINGS.contains(&tag));
        if !is_heading || !has_class(heading, HEADING_CLASS) || !has_class(anchor, ANCHOR_CLASS) {
            return Visit::Continue;
        }
        remove_class(heading, HEADING_CLASS);
        Visit::Replace(heading.clone())
    });
}

pub(crate) fn strip_link_nofollow(root: &Handle) {
    for_each_element(root, |node| {
        if !is_element(node, "a") {
            return;
        }
        let nofollow = get_attr(node, "rel")
            .is_some_and(|rel| rel.split_ascii_whitespace().any(|token| token == "nofollow"));
        if nofollow {
            remove_attr(node, "rel");
        }
    });
}

/// Point proxied images (and links to the proxied copy) back at the original.
pub(crate) fn unwrap_camo_image(root: &Handle) {
    for_each_element(root, |node| {
        if !is_element(node, "img") {
            return;
        }
        let Some(canonical) = get_attr(node, CANONICAL_SRC_ATTRIBUTE) else {
            return;
        };
        let original = get_attr(node, "src");
        if !set_attr(node, "src", &canonical) {
            insert_attr(node, "src", &canonical);
        }
        remove_attr(node, CANONICAL_SRC_ATTRIBUTE);

        if let (Some(original), Some(link)) = (original, parent(node)) {
            if is_element(&link, "a") && get_attr(&link, "href").as_deref() == Some(&*original) {
                set_attr(&link, "href", &canonical);
            }
        }
    });
}

pub(crate) fn strip_image_max_width_style(root: &Handle) {
    for_each_element(root, |node| {
        if !is_element(node, "img") {
            return;
        }
        let matches = get_attr(node, "style").is_some_and(|style| {
            let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
            MAX_WIDTH_STYLE.is_match(&compact)
        });
        if matches {
            remove_attr(node, "style");
        }
    });
}

/// `<a target="_blank"><img></a>` becomes `<img>`.
pub(crate) fn unwrap_image_link(root: &Handle) {
    walk(root, &mut |node| {
        if !is_element(node, "a") || get_attr(node, "target").as_deref() != Some("_blank") {
            return Visit::Continue;
        }
        let only_image = {
            let children = node.children.borrow();
            children.len() == 1 && is_element(&children[0], "img")
        };
        if only_image {
            Visit::Unwrap
        } else {
            Visit::Continue
        }
    });
}

pub(crate) fn strip_user_mention(root: &Handle) {
    for_each_element(root, |node| {
        if is_element(node, "a") && has_class(node, USER_MENTION_CLASS) {
            retain_attrs(node, &["href"]);
        }
    });
}

pub(crate) fn strip_issue_link(root: &Handle) {
    walk(root, &mut |node| {
        if !is_element(node, "a") {
            return Visit::Continue;
        }
        if has_class(node, ISSUE_LINK_CLASS) {
            return Visit::Unwrap;
        }
        let issue_card = matches!(
            get_attr(node, HOVERCARD_TYPE_ATTRIBUTE).as_deref(),
            Some("issue" | "pull_request")
        );
        if issue_card {
            remove_attr(node, HOVERCARD_TYPE_ATTRIBUTE);
            remove_attr(node, HOVERCARD_URL_ATTRIBUTE);
        }
        Visit::Continue
    });
}

pub(crate) fn unwrap_gemoji(root: &Handle) {
    walk(root, &mut |node| {
        if is_element(node, EMOJI_ELEMENT) {
            Visit::Unwrap
        } else {
            Visit::Continue
        }
    });
}

/// Footnote ids carry a per-render hash: `#fn-1-<32 hex>` becomes `#fn-1`.
pub(crate) fn strip_footnote_id_hash(root: &Handle) {
    for_each_element(root, |node| {
        let is_footnote = if is_element(node, "a") {
            has_attr(node, FOOTNOTE_REF_ATTRIBUTE) || has_class(node, FOOTNOTE_BACKREF_CLASS)
        } else if is_element(node, "li") {
            get_attr(node, "id").is_some_and(|id| id.starts_with(FOOTNOTE_ID_PREFIX))
        } else {
            false
        };
        if !is_footnote {
            return;
        }
        for name in ["href", "id"] {
            if let Some(value) = get_attr(node, name) {
                let stripped = FOOTNOTE_HASH.replace(&value, "");
                if stripped != value {
                    set_attr(node, name, &stripped);
                }
            }
        }
    });
}

pub(crate) fn strip_tasklist_decoration(root: &Handle) {
    for_each_element(root, |node| {
        let matched = (is_element(node, "ul") && has_class(node, TASK_LIST_CLASS))
            || (is_element(node, "li") && has_class(node, TASK_LIST_ITEM_CLASS))
            || (is_element(node, "input") && has_class(node, TASK_LIST_CHECKBOX_CLASS));
        if !matched {
            return;
        }
        if is_element(node, "input") {
            remove_attr(node, "id");
        }
        remove_attr(node, "class");
    });
}

pub(crate) fn unwrap_accessible_table(root: &Handle) {
    walk(root, &mut |node| {
        if tag_name(node).is_some_and(|tag| TABLE_WRAPPERS.contains(&tag)) {
            Visit::Unwrap
        } else {
            Visit::Continue
        }
    });
}

/// Drop the table GitHub renders for YAML frontmatter, plus the blank line
/// after it. Only ever looks at the first top-level node.
pub(crate) fn strip_frontmatter_table(root: &Handle) {
    let is_frontmatter = {
        let children = root.children.borrow();
        match children.as_slice() {
            [head, blank, ..] => is_frontmatter_table(head) && is_text(blank, "\n\n"),
            _ => false,
        }
    };
    if is_frontmatter {
        remove_child(root, 0);
        remove_child(root, 0);
    }
}

fn is_frontmatter_table(node: &Handle) -> bool {
    if tag_name(node).is_some_and(|tag| TABLE_WRAPPERS.contains(&tag)) {
        let table = node
            .children
            .borrow()
            .iter()
            .find(|child| tag_name(child).is_some())
            .cloned();
        return table.is_some_and(|table| is_frontmatter_table(&table));
    }
    is_element(node, "table")
        && get_attr(node, TABLE_TYPE_ATTRIBUTE).as_deref() == Some(FRONTMATTER_TABLE_TYPE)
        && has_element_path(node, &["tbody", "tr", "td", "div"])
}

/// Whether a chain of child elements with the given tags exists below `node`.
fn has_element_path(node: &Handle, path: &[&str]) -> bool {
    let Some((first, rest)) = path.split_first() else {
        return true;
    };
    node.children
        .borrow()
        .iter()
        .any(|child| is_element(child, first) && has_element_path(child, rest))
}
