//! Balanced delimiter scanning over TypeScript source.
//!
//! Regular expressions cannot find the end of a block whose body contains
//! nested object literals, so block extents are found by depth counting.
//! The scanner understands just enough lexical structure to not be fooled by
//! delimiters that are not code: quoted strings, template literal text (with
//! `${...}` substitutions scanned as code) and comments. Regex literals are
//! not recognized.

/// Given the byte offset of an opening `{`, `(` or `[`, return the offset one
/// past its matching closer. Returns `None` if the text ends first or a
/// mismatched closer is found.
pub fn matching_close(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let closer = match bytes.get(open)? {
        b'{' => b'}',
        b'(' => b')',
        b'[' => b']',
        _ => return None,
    };
    scan_code(bytes, open + 1, closer)
}

fn scan_code(bytes: &[u8], mut i: usize, closer: u8) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_string(bytes, i),
            b'`' => i = skip_template(bytes, i)?,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |p| i + p + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = bytes[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map(|p| i + 2 + p + 2)?;
            }
            b'{' => i = scan_code(bytes, i + 1, b'}')?,
            b'(' => i = scan_code(bytes, i + 1, b')')?,
            b'[' => i = scan_code(bytes, i + 1, b']')?,
            c if c == closer => return Some(i + 1),
            b'}' | b')' | b']' => return None,
            _ => i += 1,
        }
    }
    None
}

/// Skip a quoted string starting at `i`. An unterminated string ends at the
/// newline, matching how the engine would reject it.
fn skip_string(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn skip_template(bytes: &[u8], i: usize) -> Option<usize> {
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'`' => return Some(j + 1),
            b'$' if bytes.get(j + 1) == Some(&b'{') => j = scan_code(bytes, j + 2, b'}')?,
            _ => j += 1,
        }
    }
    None
}
