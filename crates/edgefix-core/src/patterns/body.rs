//! Request-body extraction of the `user_id` field.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Match, Recognizer, Span};

static AWAIT_JSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"const\s*\{[^}]*\buser_id\b[^}]*\}\s*=\s*await\s+req\.json\(\)[^;\n]*;").unwrap()
});

static BODY_CAST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"const\s*\{[^}]*\buser_id\b[^}]*\}\s*=\s*body\s+as\s[^;]+;").unwrap()
});

/// `const { user_id, ... } = await req.json();`
pub fn destructured_json(content: &str) -> Match {
    AWAIT_JSON_RE.find(content).map(|m| (Span::from(m), ())).into()
}

/// `const { user_id, ... } = body as SomeType;`
pub fn destructured_cast(content: &str) -> Match {
    BODY_CAST_RE.find(content).map(|m| (Span::from(m), ())).into()
}

/// Statements that bring `user_id` into scope. The user-scoped auth call must
/// come after whichever one matches.
pub fn user_id_cascade() -> [Recognizer<'static>; 2] {
    [
        Recognizer::new("await req.json()", destructured_json),
        Recognizer::new("typed body", destructured_cast),
    ]
}
