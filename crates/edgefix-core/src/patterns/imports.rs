use once_cell::sync::Lazy;
use regex::Regex;

use super::Span;

static NAMED_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s*\{([^}]*)\}\s*from\s*['"]([^'"]*)['"][ \t]*;?"#).unwrap()
});

static SINGLE_LINE_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^import\s[^\n]*from\s*['"][^'"\n]+['"][ \t]*;?[ \t]*$"#).unwrap()
});

/// `import { a, b } from 'path';`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub span: Span,
    /// Text between the braces.
    pub names: Span,
    pub path: String,
}

impl NamedImport {
    pub fn imported_names<'s>(&self, content: &'s str) -> impl Iterator<Item = &'s str> {
        self.names
            .slice(content)
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.split_whitespace().next().unwrap_or(name))
    }

    pub fn has_name(&self, content: &str, name: &str) -> bool {
        self.imported_names(content).any(|n| n == name)
    }

    /// Offset where another name can be appended: just past the last
    /// non-whitespace, non-comma character inside the braces.
    pub fn append_point(&self, content: &str) -> usize {
        let names = self.names.slice(content);
        let kept = names.trim_end_matches(|c: char| c.is_whitespace() || c == ',');
        self.names.start + kept.len()
    }
}

pub fn named_imports(content: &str) -> Vec<NamedImport> {
    NAMED_IMPORT_RE
        .captures_iter(content)
        .filter_map(|caps| {
            Some(NamedImport {
                span: caps.get(0)?.into(),
                names: caps.get(1)?.into(),
                path: caps.get(2)?.as_str().to_string(),
            })
        })
        .collect()
}

/// First named import whose path resolves to `module`, wherever it lives.
pub fn find_module_import(content: &str, module: &str) -> Option<NamedImport> {
    named_imports(content)
        .into_iter()
        .find(|import| import.path == module || import.path.ends_with(&format!("/{module}")))
}

/// The last import statement written on a single line.
pub fn last_import_line(content: &str) -> Option<Span> {
    SINGLE_LINE_IMPORT_RE.find_iter(content).last().map(Span::from)
}
