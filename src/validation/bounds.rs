//! Size and depth limits for inbound canonical requests.

/// Default cap on the serialized request payload.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Default cap on structural query nesting.
pub const DEFAULT_MAX_QUERY_DEPTH: usize = 10;

/// Cap on how many allowed operation names an error message lists.
pub const MAX_NAMES_IN_ERROR: usize = 25;

#[derive(Debug, Clone, Copy)]
pub struct ValidationLimits {
    pub max_payload_bytes: usize,
    pub max_query_depth: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_query_depth: DEFAULT_MAX_QUERY_DEPTH,
        }
    }
}

/// Maximum brace nesting depth of a query document.
///
/// Lexical approximation, not a parse: braces inside double-quoted string
/// literals (and their escapes) are ignored, everything else counts. Good
/// enough to bound resource usage without a GraphQL parser.
pub fn scan_depth(query: &str) -> usize {
    let mut depth: usize = 0;
    let mut max_depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for ch in query.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn counts_plain_nesting() {
        assert_eq!(scan_depth("query A { a { b { c } } }"), 3);
        assert_eq!(scan_depth("query A { a }"), 1);
        assert_eq!(scan_depth(""), 0);
    }

    #[test]
    fn ignores_braces_in_strings() {
        assert_eq!(scan_depth(r#"query A { a(filter: "{{{") }"#), 1);
        assert_eq!(scan_depth(r#"query A { a(x: "}") { b } }"#), 2);
    }

    #[test]
    fn handles_escaped_quotes() {
        assert_eq!(scan_depth(r#"query A { a(x: "he said \"{\" loudly") }"#), 1);
    }

    #[test]
    fn unbalanced_braces_do_not_underflow() {
        assert_eq!(scan_depth("} } } { a }"), 1);
    }

    proptest! {
        // Depth of a document never exceeds its open-brace count, and string
        // content never contributes.
        #[test]
        fn depth_bounded_by_open_braces(body in "[a-z{} ]{0,64}", literal in "[{}a-z]{0,16}") {
            let with_literal = format!("query Q {{ f(arg: \"{literal}\") {body} }}");
            let open_braces = with_literal.matches('{').count();
            prop_assert!(scan_depth(&with_literal) <= open_braces);

            let without = format!("query Q {{ f(arg: \"\") {body} }}");
            prop_assert_eq!(scan_depth(&with_literal), scan_depth(&without));
        }
    }
}
