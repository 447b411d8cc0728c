// Fragment → HTML string serializer.
//
// Emits the minimal markup a standard HTML stringifier (rehype-stringify,
// hast-util-to-html) produces: known boolean attributes collapse to their
// bare name, void elements get no closing tag, and only the characters that
// would otherwise change meaning are escaped.

pub(crate) mod escape;
pub(crate) mod handlers;

use crate::tree::Fragment;

/// Serializer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Attribute value quote: `"` (default) or `'`.
    pub quote: char,
    /// Print every attribute with an empty value as a bare name, not just
    /// known boolean attributes.
    pub collapse_empty_attributes: bool,
    /// Close void elements XML-style (`<br />`).
    pub close_self_closing: bool,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            quote: '"',
            collapse_empty_attributes: false,
            close_self_closing: false,
        }
    }
}

/// Serializer state threaded through all handlers.
pub(crate) struct State<'a> {
    pub options: &'a StringifyOptions,
    pub output: String,
}

/// Serialize a fragment's top-level nodes to an HTML string.
pub fn stringify(fragment: &Fragment, options: &StringifyOptions) -> String {
    let mut state = State {
        options,
        output: String::new(),
    };
    for child in fragment.root().children.borrow().iter() {
        handlers::handle(&mut state, child);
    }
    state.output
}

/// Serialize and newline-normalize: a nonempty result always ends in `\n`.
pub fn to_artifact(fragment: &Fragment, options: &StringifyOptions) -> String {
    let mut output = stringify(fragment, options);
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
