//! Structural recognizers for handler boilerplate.
//!
//! Each recognizer targets one known shape and reports where it sits in the
//! source. Nothing here parses TypeScript: shapes are found with regular
//! expressions, and block extents with [`crate::scan::matching_close`].
//! Anything a recognizer does not anticipate is reported as
//! [`Match::NotFound`] and left for the caller to warn about.

pub mod body;
pub mod catch;
pub mod client;
pub mod headers;
pub mod imports;
pub mod origin;
pub mod preflight;

/// Half-open byte range within a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'s>(&self, content: &'s str) -> &'s str {
        &content[self.start..self.end]
    }
}

impl From<regex::Match<'_>> for Span {
    fn from(m: regex::Match<'_>) -> Self {
        Self::new(m.start(), m.end())
    }
}

/// Result of a recognizer. `C` carries any sub-spans or names the caller
/// needs to format a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<C = ()> {
    NotFound,
    Found { span: Span, captures: C },
}

impl Match<()> {
    pub fn found(span: Span) -> Self {
        Match::Found { span, captures: () }
    }
}

impl<C> Match<C> {
    pub fn is_found(&self) -> bool {
        matches!(self, Match::Found { .. })
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Match::Found { span, .. } => Some(*span),
            Match::NotFound => None,
        }
    }
}

impl<C> From<Option<(Span, C)>> for Match<C> {
    fn from(value: Option<(Span, C)>) -> Self {
        match value {
            Some((span, captures)) => Match::Found { span, captures },
            None => Match::NotFound,
        }
    }
}

/// A named recognizer, one entry in a fallback cascade.
pub struct Recognizer<'a, C = ()> {
    pub name: &'static str,
    find: Box<dyn Fn(&str) -> Match<C> + 'a>,
}

impl<'a, C> Recognizer<'a, C> {
    pub fn new(name: &'static str, find: impl Fn(&str) -> Match<C> + 'a) -> Self {
        Self {
            name,
            find: Box::new(find),
        }
    }

    pub fn find(&self, content: &str) -> Match<C> {
        (self.find)(content)
    }
}

/// A cascade hit: which recognizer matched, where, and what it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit<C = ()> {
    pub recognizer: &'static str,
    pub span: Span,
    pub captures: C,
}

/// Try each recognizer in order and return the first hit.
pub fn first_match<C>(content: &str, cascade: &[Recognizer<'_, C>]) -> Option<Hit<C>> {
    cascade.iter().find_map(|r| match r.find(content) {
        Match::Found { span, captures } => Some(Hit {
            recognizer: r.name,
            span,
            captures,
        }),
        Match::NotFound => None,
    })
}
