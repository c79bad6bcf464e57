//! Solr query escaping for filter fragment construction.
//!
//! Two flavours, matching what the backend expects in different positions:
//! the lesser escape is used for field names and leaves `*` and `\` usable,
//! the facet escape covers values and escapes those too.

/// Escape Solr query specials in a field name.
pub fn lesser_escape(value: &str) -> String {
    escape(value, |c| {
        matches!(
            c,
            '+' | '-' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '~' | '?' | ':' | '"'
                | ';' | ' '
        )
    })
}

/// Escape Solr query specials in a facet value.
pub fn facet_escape(value: &str) -> String {
    escape(value, |c| {
        matches!(
            c,
            '+' | '-' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~' | '*' | '?'
                | ':' | '\\' | ' '
        )
    })
}

/// Remove one level of backslash escaping.
pub fn strip_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape<F: Fn(char) -> bool>(value: &str, is_special: F) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    let chars: Vec<char> = value.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        // `&&` and `||` are the only two-character operators; lone `&`/`|`
        // pass through untouched.
        if (c == '&' || c == '|') && chars.get(i + 1) == Some(&c) {
            out.push('\\');
            out.push(c);
            out.push(c);
            i += 2;
            continue;
        }
        if is_special(c) {
            out.push('\\');
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_escape() {
        assert_eq!(facet_escape("a:b c"), "a\\:b\\ c");
        assert_eq!(facet_escape("plain"), "plain");
        assert_eq!(facet_escape("wild*card"), "wild\\*card");
        assert_eq!(facet_escape("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_lesser_escape_keeps_wildcards() {
        assert_eq!(lesser_escape("dc.title"), "dc.title");
        assert_eq!(lesser_escape("a b"), "a\\ b");
        assert_eq!(lesser_escape("star*"), "star*");
    }

    #[test]
    fn test_double_operators() {
        assert_eq!(facet_escape("a && b"), "a\\ \\&&\\ b");
        assert_eq!(facet_escape("a & b"), "a\\ &\\ b");
        assert_eq!(facet_escape("a || b"), "a\\ \\||\\ b");
    }

    #[test]
    fn test_strip_slashes() {
        assert_eq!(strip_slashes("a\\:b"), "a:b");
        assert_eq!(strip_slashes("plain"), "plain");
        assert_eq!(strip_slashes("trailing\\"), "trailing");
    }
}
