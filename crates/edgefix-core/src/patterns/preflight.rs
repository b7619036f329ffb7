use once_cell::sync::Lazy;
use regex::Regex;

use super::{Match, Recognizer, Span};
use crate::scan::matching_close;

static OPTIONS_GUARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"if\s*\(\s*(?:[A-Za-z_$][\w$]*\.)?method\s*===?\s*(?:'OPTIONS'|"OPTIONS")\s*\)\s*\{"#,
    )
    .unwrap()
});

static RAW_RESPONSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"return\s+new\s+Response\s*\(").unwrap());

static CORS_HEADERS_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcorsHeaders\b").unwrap());

static RETURN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\breturn\b").unwrap());

static DELEGATION_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"if\s*\(\s*(?:[A-Za-z_$][\w$]*\.)?method\s*===?\s*(?:'OPTIONS'|"OPTIONS")\s*\)\s*\{\s*return\s+handleCorsPreflightRequest\(\s*origin\s*\)\s*;?\s*\}"#,
    )
    .unwrap()
});

/// An `if (req.method === 'OPTIONS') {` guard. The receiver is optional, so a
/// destructured `method` matches too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsGuard {
    /// Offset of the `if`.
    pub start: usize,
    /// Offset of the opening brace.
    pub open: usize,
    /// Offset one past the matching closing brace, `None` if unbalanced.
    pub end: Option<usize>,
}

impl OptionsGuard {
    pub fn block(&self) -> Option<Span> {
        self.end.map(|end| Span::new(self.start, end))
    }

    /// Text between the braces.
    pub fn body<'s>(&self, content: &'s str) -> Option<&'s str> {
        self.end.map(|end| &content[self.open + 1..end - 1])
    }
}

pub fn find_options_guards(content: &str) -> Vec<OptionsGuard> {
    OPTIONS_GUARD_RE
        .find_iter(content)
        .map(|m| {
            let open = m.end() - 1;
            OptionsGuard {
                start: m.start(),
                open,
                end: matching_close(content, open),
            }
        })
        .collect()
}

fn first_guard_where(content: &str, pred: impl Fn(&str) -> bool) -> Match {
    find_options_guards(content)
        .into_iter()
        .find_map(|g| {
            let body = g.body(content)?;
            if pred(body) {
                g.block()
            } else {
                None
            }
        })
        .map(|span| (span, ()))
        .into()
}

/// OPTIONS block that returns a raw `new Response(...)` built from the ad-hoc
/// `corsHeaders` table.
pub fn raw_response_guard(content: &str) -> Match {
    first_guard_where(content, |body| {
        RAW_RESPONSE_RE.is_match(body) && CORS_HEADERS_REF_RE.is_match(body)
    })
}

/// Any OPTIONS block that returns something.
pub fn returning_guard(content: &str) -> Match {
    first_guard_where(content, |body| RETURN_RE.is_match(body))
}

/// Any balanced OPTIONS block, whatever it contains.
pub fn any_guard(content: &str) -> Match {
    first_guard_where(content, |_| true)
}

/// The canonical block delegating to `handleCorsPreflightRequest(origin)`.
pub fn delegation_block(content: &str) -> Match {
    DELEGATION_BLOCK_RE
        .find(content)
        .map(|m| (Span::from(m), ()))
        .into()
}

/// Cascade used to replace an inline preflight handler.
pub fn inline_handler_cascade() -> [Recognizer<'static>; 2] {
    [
        Recognizer::new("corsHeaders response", raw_response_guard),
        Recognizer::new("generic", returning_guard),
    ]
}

/// Cascade locating the end of the preflight handling, where request
/// processing proper begins.
pub fn handler_end_cascade() -> [Recognizer<'static>; 2] {
    [
        Recognizer::new("preflight delegation", delegation_block),
        Recognizer::new("OPTIONS guard", any_guard),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::first_match;

    #[test]
    fn test_nested_literal_block_is_matched_whole() {
        let src = "  if (method === 'x') {}\n  if (req.method === 'OPTIONS') { return new Response(JSON.stringify({a:{b:1}}), {headers: corsHeaders}); }\n  next();";
        let hit = first_match(src, &inline_handler_cascade()).unwrap();
        assert_eq!(hit.recognizer, "corsHeaders response");
        assert!(hit.span.slice(src).starts_with("if (req.method"));
        assert!(hit.span.slice(src).ends_with("}); }"));
        assert_eq!(&src[hit.span.end..], "\n  next();");
    }

    #[test]
    fn test_bare_method_guard() {
        let src = "  const { method } = req;\n  if (method === 'OPTIONS') { return new Response(JSON.stringify({a:{b:1}}), {headers: X}); }\n  next();";
        let hit = first_match(src, &inline_handler_cascade()).unwrap();
        assert_eq!(hit.recognizer, "generic");
        assert!(hit.span.slice(src).starts_with("if (method === 'OPTIONS')"));
        assert_eq!(&src[hit.span.end..], "\n  next();");

        assert!(find_options_guards("if (xmethod === 'OPTIONS') {}").is_empty());
        assert!(delegation_block("if (request.method === 'OPTIONS') { return handleCorsPreflightRequest(origin); }").is_found());
    }

    #[test]
    fn test_generic_fallback() {
        let src = "if (req.method === \"OPTIONS\") {\n  return new Response(null, { status: 204 });\n}\n";
        let hit = first_match(src, &inline_handler_cascade()).unwrap();
        assert_eq!(hit.recognizer, "generic");
        assert_eq!(hit.span.end, src.len() - 1);
    }

    #[test]
    fn test_guard_without_return_is_not_replaced() {
        let src = "if (req.method === 'OPTIONS') {\n  log('preflight');\n}\n";
        assert!(first_match(src, &inline_handler_cascade()).is_none());
        assert!(any_guard(src).is_found());
    }

    #[test]
    fn test_unbalanced_guard() {
        let src = "if (req.method === 'OPTIONS') {\n  return new Response('ok', { headers: corsHeaders });\n";
        let guards = find_options_guards(src);
        assert_eq!(guards.len(), 1);
        assert_eq!(guards[0].end, None);
        assert!(first_match(src, &inline_handler_cascade()).is_none());
    }

    #[test]
    fn test_delegation_block() {
        let src = "  if (req.method === 'OPTIONS') {\n    return handleCorsPreflightRequest(origin);\n  }\n\n  try {";
        let hit = first_match(src, &handler_end_cascade()).unwrap();
        assert_eq!(hit.recognizer, "preflight delegation");
        assert_eq!(&src[hit.span.end..], "\n\n  try {");
    }
}
