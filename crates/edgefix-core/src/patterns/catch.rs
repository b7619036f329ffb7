use once_cell::sync::Lazy;
use regex::Regex;

use super::Span;

static CATCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\}\s*catch\s*\(\s*([A-Za-z_$][\w$]*)\s*(?::[^)]*)?\)\s*\{[ \t]*\r?\n").unwrap()
});

static RESPONSE_GUARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"instanceof\s+Response\s*\)\s*return\b").unwrap());

/// A `} catch (binding) {` opening that ends its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchBlock {
    /// Where the first body line starts.
    pub body_start: usize,
    /// Offset of the `{` opening the catch body.
    pub open: usize,
    pub binding: String,
}

pub fn find_catch_blocks(content: &str) -> Vec<CatchBlock> {
    CATCH_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let binding = caps.get(1)?.as_str().to_string();
            let open = whole.start() + whole.as_str().rfind('{')?;
            Some(CatchBlock {
                body_start: whole.end(),
                open,
                binding,
            })
        })
        .collect()
}

/// Where an existing `x instanceof Response) return` guard sits, if any.
pub fn response_guard(content: &str) -> Option<Span> {
    RESPONSE_GUARD_RE.find(content).map(Span::from)
}
