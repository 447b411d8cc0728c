// Node handlers for fragment → HTML serialization.
//
// One handler per rcdom node kind. Each appends to `state.output`.

use markup5ever_rcdom::{Handle, NodeData};

use super::escape::{escape_attribute, escape_text};
use super::State;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "image", "img",
    "input", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text content is emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "plaintext", "script", "style", "xmp",
];

/// Attributes printed as a bare name when their value is empty.
const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen", "async", "autofocus", "autoplay", "checked", "controls", "default",
    "defer", "disabled", "formnovalidate", "hidden", "inert", "ismap", "itemscope", "loop",
    "multiple", "muted", "nomodule", "novalidate", "open", "playsinline", "readonly",
    "required", "reversed", "selected",
];

/// Dispatch to the appropriate handler for a node.
pub(crate) fn handle(state: &mut State, node: &Handle) {
    match node.data {
        NodeData::Text { ref contents } => {
            let text = escape_text(&contents.borrow());
            state.output.push_str(&text);
        }
        NodeData::Comment { ref contents } => {
            state.output.push_str("<!--");
            state.output.push_str(contents);
            state.output.push_str("-->");
        }
        NodeData::Element { .. } => handle_element(state, node),
        NodeData::Document => all(state, node),
        _ => {}
    }
}

fn all(state: &mut State, node: &Handle) {
    for child in node.children.borrow().iter() {
        handle(state, child);
    }
}

fn handle_element(state: &mut State, node: &Handle) {
    let NodeData::Element {
        ref name,
        ref attrs,
        ref template_contents,
        ..
    } = node.data
    else {
        return;
    };
    let tag = name.local.as_ref();

    state.output.push('<');
    state.output.push_str(tag);
    for attr in attrs.borrow().iter() {
        state.output.push(' ');
        if let Some(ref prefix) = attr.name.prefix {
            state.output.push_str(prefix);
            state.output.push(':');
        }
        let attr_name = attr.name.local.as_ref();
        state.output.push_str(attr_name);

        let bare = attr.value.is_empty()
            && (state.options.collapse_empty_attributes || BOOLEAN_ATTRIBUTES.contains(&attr_name));
        if !bare {
            let quote = state.options.quote;
            state.output.push('=');
            state.output.push(quote);
            state.output.push_str(&escape_attribute(&attr.value, quote));
            state.output.push(quote);
        }
    }

    if VOID_ELEMENTS.contains(&tag) {
        if state.options.close_self_closing {
            state.output.push_str(" /");
        }
        state.output.push('>');
        return;
    }
    state.output.push('>');

    if RAW_TEXT_ELEMENTS.contains(&tag) {
        for child in node.children.borrow().iter() {
            if let NodeData::Text { ref contents } = child.data {
                state.output.push_str(&contents.borrow());
            }
        }
    } else if let Some(ref contents) = *template_contents.borrow() {
        all(state, contents);
    } else {
        all(state, node);
    }

    state.output.push_str("</");
    state.output.push_str(tag);
    state.output.push('>');
}
