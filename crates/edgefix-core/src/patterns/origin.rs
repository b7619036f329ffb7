use once_cell::sync::Lazy;
use regex::Regex;

use super::Span;
use crate::canonical::ORIGIN_LINE;

static ORIGIN_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*(const\s+origin\s*=\s*req\.headers\.get\(\s*(?:'(?i:origin)'|"(?i:origin)")\s*\)[ \t]*;?)[ \t]*(?:\r?\n|$)"#,
    )
    .unwrap()
});

/// One `const origin = req.headers.get('Origin')` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginLine {
    /// The whole line, including its newline.
    pub line: Span,
    /// The statement itself, without indentation or trailing whitespace.
    pub statement: Span,
}

impl OriginLine {
    pub fn is_canonical(&self, content: &str) -> bool {
        self.statement.slice(content) == ORIGIN_LINE
    }
}

/// Every origin-extraction line in source order. Header name casing and
/// quote style may vary; the trailing semicolon is optional.
pub fn find_origin_lines(content: &str) -> Vec<OriginLine> {
    ORIGIN_LINE_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let statement = caps.get(1)?;
            Some(OriginLine {
                line: whole.into(),
                statement: statement.into(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_variants_in_order() {
        let src = "serve(async (req) => {\n  const origin = req.headers.get('Origin');\n  x();\n    const origin = req.headers.get(\"origin\")\n});\n";
        let lines = find_origin_lines(src);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].is_canonical(src));
        assert!(!lines[1].is_canonical(src));
        assert_eq!(
            lines[1].statement.slice(src),
            "const origin = req.headers.get(\"origin\")"
        );
        assert_eq!(
            lines[1].line.slice(src),
            "    const origin = req.headers.get(\"origin\")\n"
        );
    }

    #[test]
    fn test_ignores_other_headers_and_inline_uses() {
        let src = "const auth = req.headers.get('Authorization');\nfoo(req.headers.get('Origin'));\n";
        assert!(find_origin_lines(src).is_empty());
    }
}
