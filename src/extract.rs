// Fragment extraction from a rendered gist page.
//
// File renderings are matched back to their slot by the visible file name, so
// the page may list them in any order. Comment renderings carry no identifier:
// the Nth comment body on the page is taken to be the Nth comment posted.

use std::sync::LazyLock;

use markup5ever_rcdom::Handle;
use regex::Regex;

use crate::error::FixtureError;
use crate::tree::{
    find_all, find_first, has_class, is_whitespace_text, parse_html, text_content, Fragment,
};

const FILE_CLASS: &str = "file";
const FILE_NAME_CLASS: &str = "gist-blob-name";
const BODY_CLASS: &str = "markdown-body";
const COMMENT_BODY_CLASS: &str = "comment-body";
// The new-comment form carries an (empty) preview with the same classes.
const PREVIEW_CLASS: &str = "js-preview-body";

static SLOT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^slot-(\d+)(?:\.md)?$").unwrap());

/// File name of the gist entry for a slot.
pub(crate) fn slot_filename(index: usize) -> String {
    format!("slot-{index}.md")
}

/// Parse the slot index out of a rendered file name.
pub(crate) fn parse_slot(name: &str) -> Result<usize, FixtureError> {
    SLOT_NAME
        .captures(name)
        .and_then(|captures| captures[1].parse().ok())
        .ok_or_else(|| FixtureError::SlotName(name.to_string()))
}

/// What the submitted container held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Number of file-mode sources (slots `0..slots`).
    pub slots: usize,
    /// Number of comments posted.
    pub comments: usize,
    /// Whether a placeholder entry was submitted as slot 0 because there were
    /// no file-mode sources.
    pub placeholder: bool,
}

/// Fragments recovered from one rendered page.
#[derive(Debug)]
pub struct Extracted {
    /// Indexed by slot number.
    pub files: Vec<Fragment>,
    /// In document order, which is posting order.
    pub comments: Vec<Fragment>,
}

/// Slice a rendered page into one fragment per slot and per comment.
pub fn extract(document: &str, layout: &Layout) -> Result<Extracted, FixtureError> {
    // The dom must outlive every `take` below.
    let dom = parse_html(document);

    let files = extract_files(&dom.document, layout)?;
    let comments = extract_comments(&dom.document);
    if comments.len() != layout.comments {
        return Err(FixtureError::CommentCount {
            expected: layout.comments,
            found: comments.len(),
        });
    }

    tracing::debug!(files = files.len(), comments = comments.len(), "extracted fragments");
    Ok(Extracted { files, comments })
}

fn extract_files(document: &Handle, layout: &Layout) -> Result<Vec<Fragment>, FixtureError> {
    let mut files: Vec<Option<Fragment>> = (0..layout.slots).map(|_| None).collect();

    for container in find_all(document, &mut |node| has_class(node, FILE_CLASS)) {
        let name = find_first(&container, &mut |node| has_class(node, FILE_NAME_CLASS))
            .map(|node| text_content(&node))
            .ok_or(FixtureError::MissingSlotName)?;
        let index = parse_slot(name.trim())?;
        let body = find_first(&container, &mut |node| has_class(node, BODY_CLASS))
            .ok_or(FixtureError::MissingBody("file"))?;

        if layout.placeholder && layout.slots == 0 && index == 0 {
            continue;
        }
        let slot = files.get_mut(index).ok_or(FixtureError::SlotOutOfRange {
            index,
            expected: layout.slots,
        })?;
        if slot.is_some() {
            return Err(FixtureError::DuplicateSlot(index));
        }
        *slot = Some(Fragment::adopt(body.children.take()));
    }

    files
        .into_iter()
        .enumerate()
        .map(|(index, fragment)| fragment.ok_or(FixtureError::MissingSlot(index)))
        .collect()
}

fn extract_comments(document: &Handle) -> Vec<Fragment> {
    let bodies = find_all(document, &mut |node| {
        has_class(node, COMMENT_BODY_CLASS) && !has_class(node, PREVIEW_CLASS)
    });
    bodies
        .into_iter()
        .map(|body| {
            let mut children = body.children.take();
            if children.first().is_some_and(is_whitespace_text) {
                children.remove(0);
            }
            if children.last().is_some_and(is_whitespace_text) {
                children.pop();
            }
            Fragment::adopt(children)
        })
        .collect()
}
