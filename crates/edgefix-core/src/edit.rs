//! Byte-range edits over a source text.

use crate::error::{CodemodError, Result};

/// Replace `start..end` of the source with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl SourceEdit {
    pub fn replace(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Self::replace(start, end, String::new())
    }
}

/// Apply edits to `content`. Edits are sorted and applied back to front so
/// earlier offsets stay valid. Overlapping ranges are rejected; two
/// insertions at the same offset keep their original order.
pub fn apply_edits(content: &str, mut edits: Vec<SourceEdit>) -> Result<String> {
    if edits.is_empty() {
        return Ok(content.to_string());
    }

    for edit in &edits {
        if edit.start > edit.end || edit.end > content.len() {
            return Err(CodemodError::EditOutOfBounds {
                start: edit.start,
                end: edit.end,
                len: content.len(),
            });
        }
        if !content.is_char_boundary(edit.start) || !content.is_char_boundary(edit.end) {
            return Err(CodemodError::EditNotOnCharBoundary {
                start: edit.start,
                end: edit.end,
            });
        }
    }

    edits.sort_by_key(|e| (e.start, e.end));
    for pair in edits.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start < a.end {
            return Err(CodemodError::OverlappingEdits {
                first: (a.start, a.end),
                second: (b.start, b.end),
            });
        }
    }

    let mut out = content.to_string();
    for edit in edits.into_iter().rev() {
        out.replace_range(edit.start..edit.end, &edit.replacement);
    }
    Ok(out)
}

/// Delete the whole lines `start..end`, also swallowing one following blank
/// line when the removal would leave two blank lines in a row or a blank
/// line right after an opening brace.
pub fn delete_lines(content: &str, start: usize, end: usize) -> SourceEdit {
    let before = &content[..start];
    let after = &content[end..];
    let blank_before = before.is_empty()
        || before.ends_with("\n\n")
        || before.ends_with("\n\r\n")
        || before.trim_end_matches([' ', '\t', '\r', '\n']).ends_with('{');
    let extra = if !blank_before {
        0
    } else if after.starts_with('\n') {
        1
    } else if after.starts_with("\r\n") {
        2
    } else {
        0
    };
    SourceEdit::delete(start, end + extra)
}

/// Byte offset of the start of the line containing `pos`.
pub fn line_start(content: &str, pos: usize) -> usize {
    content[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// Byte offset just past the newline that ends the line containing `pos`,
/// or the end of the text for the last line.
pub fn line_end_inclusive(content: &str, pos: usize) -> usize {
    content[pos..]
        .find('\n')
        .map_or(content.len(), |i| pos + i + 1)
}

/// Leading spaces and tabs of the line containing `pos`.
pub fn indent_at(content: &str, pos: usize) -> &str {
    let start = line_start(content, pos);
    let line = &content[start..];
    let len = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..len]
}
