use once_cell::sync::Lazy;
use regex::Regex;

use super::{Match, Span};

static HEADERS_CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:export\s+)?const\s+corsHeaders\s*(?::[^=\n]+)?=\s*\{[^{}]*\}[ \t]*(?:as\s+const[ \t]*)?;?[ \t]*(?:\r?\n|$)",
    )
    .unwrap()
});

static HEADERS_ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*const\s+corsHeaders\s*=\s*getCorsHeaders\(\s*origin\s*\)[ \t]*;?[ \t]*(?:\r?\n|$)",
    )
    .unwrap()
});

static HEADERS_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcorsHeaders\b").unwrap());

/// `headers: corsHeaders`
static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"headers:\s*corsHeaders\b").unwrap());

/// `headers: { 'Content-Type': 'application/json' }`
static JSON_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"headers:\s*\{\s*['"]Content-Type['"]\s*:\s*['"]application/json['"]\s*,?\s*\}"#)
        .unwrap()
});

/// `{ ...corsHeaders, 'Content-Type': 'application/json' }`
static SPREAD_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\{\s*\.\.\.corsHeaders\s*,\s*['"]Content-Type['"]\s*:\s*['"]application/json['"]\s*,?\s*\}"#,
    )
    .unwrap()
});

/// `{ 'Content-Type': 'application/json', ...corsHeaders }`
static SPREAD_LAST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\{\s*['"]Content-Type['"]\s*:\s*['"]application/json['"]\s*,\s*\.\.\.corsHeaders\s*,?\s*\}"#,
    )
    .unwrap()
});

/// `corsHeaders` passed as the last call argument: `, corsHeaders)`
static TRAILING_ARG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*corsHeaders\s*\)").unwrap());

/// The ad-hoc `const corsHeaders = { ... };` table, as whole lines.
pub fn headers_constant(content: &str) -> Match {
    HEADERS_CONST_RE
        .find(content)
        .map(|m| (Span::from(m), ()))
        .into()
}

/// Every `const corsHeaders = getCorsHeaders(origin);` alias line.
pub fn headers_alias_lines(content: &str) -> Vec<Span> {
    HEADERS_ALIAS_RE.find_iter(content).map(Span::from).collect()
}

pub fn count_headers_refs(content: &str) -> usize {
    HEADERS_REF_RE.find_iter(content).count()
}

/// Response-construction shapes that reference the ad-hoc header table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Bare,
    JsonOnly,
    SpreadFirst,
    SpreadLast,
    TrailingArgument,
}

impl ResponseShape {
    pub const ALL: [ResponseShape; 5] = [
        ResponseShape::Bare,
        ResponseShape::JsonOnly,
        ResponseShape::SpreadFirst,
        ResponseShape::SpreadLast,
        ResponseShape::TrailingArgument,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            ResponseShape::Bare => &*BARE_RE,
            ResponseShape::JsonOnly => &*JSON_ONLY_RE,
            ResponseShape::SpreadFirst => &*SPREAD_FIRST_RE,
            ResponseShape::SpreadLast => &*SPREAD_LAST_RE,
            ResponseShape::TrailingArgument => &*TRAILING_ARG_RE,
        }
    }
}

/// All response-header sites in the file, sorted by position. Where two
/// shapes overlap the earlier one wins.
pub fn response_header_sites(content: &str) -> Vec<(ResponseShape, Span)> {
    let mut sites: Vec<(ResponseShape, Span)> = ResponseShape::ALL
        .iter()
        .flat_map(|&shape| {
            shape
                .regex()
                .find_iter(content)
                .map(move |m| (shape, Span::from(m)))
        })
        .collect();
    sites.sort_by_key(|(_, span)| span.start);
    let mut end = 0;
    sites.retain(|(_, span)| {
        let keep = span.start >= end;
        if keep {
            end = span.end;
        }
        keep
    });
    sites
}
