// Character references for HTML serialization.
//
// Mirrors the subsets hast-util-to-html escapes: `<` and `&` in text, the
// active quote and `&` in attribute values. References are hexadecimal.

/// Escape text content.
pub(crate) fn escape_text(value: &str) -> String {
    escape(value, &['<', '&'])
}

/// Escape a quoted attribute value.
pub(crate) fn escape_attribute(value: &str, quote: char) -> String {
    escape(value, &[quote, '&'])
}

fn escape(value: &str, subset: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if subset.contains(&c) {
            out.push_str(&format!("&#x{:X};", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_subset() {
        assert_eq!(escape_text("a<b&c>d\"e"), "a&#x3C;b&#x26;c>d\"e");
    }

    #[test]
    fn attribute_uses_active_quote() {
        assert_eq!(escape_attribute(r#"it's "x""#, '"'), "it's &#x22;x&#x22;");
        assert_eq!(escape_attribute(r#"it's "x""#, '\''), r#"it&#x27;s "x""#);
    }
}
