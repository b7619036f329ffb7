//! Service-credential client constructions (`createClient(...)`).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{Match, Recognizer, Span};
use crate::scan::matching_close;

/// Captures of a construction: the variable the client was bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientBinding {
    pub var: String,
}

static MULTILINE_SERVICE_ROLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*const\s+([A-Za-z_$][\w$]*)\s*=\s*createClient\(\s*\n\s*Deno\.env\.get\(\s*['"]SUPABASE_URL['"]\s*\)[^,]*,\s*\n\s*Deno\.env\.get\(\s*['"]SUPABASE_SERVICE_ROLE_KEY['"]\s*\)[^)]*\)[ \t]*;?[ \t]*(?:\r?\n|$)"#,
    )
    .unwrap()
});

static SERVICE_KEY_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*const\s+supabaseServiceKey\s*=\s*Deno\.env\.get\(\s*['"]SUPABASE_SERVICE_ROLE_KEY['"]\s*\)!?[ \t]*;?[ \t]*\r?\n[ \t]*const\s+([A-Za-z_$][\w$]*)\s*=\s*createClient\(\s*supabaseUrl\s*,\s*supabaseServiceKey\s*\)[ \t]*;?[ \t]*(?:\r?\n|$)"#,
    )
    .unwrap()
});

static REQUIRE_ENV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*const\s+supabaseKey\s*=\s*requireEnv\(\s*['"]SUPABASE_SERVICE_ROLE_KEY['"]\s*\)[ \t]*;?[ \t]*\r?\n[ \t]*const\s+([A-Za-z_$][\w$]*)\s*=\s*createClient\(\s*supabaseUrl\s*,\s*supabaseKey\s*\)[ \t]*;?[ \t]*(?:\r?\n|$)"#,
    )
    .unwrap()
});

static CALLER_SCOPED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*const\s+([A-Za-z_$][\w$]*)\s*=\s*createClient\(\s*Deno\.env\.get\(\s*['"]SUPABASE_URL['"]\s*\)[^,]*,\s*Deno\.env\.get\(\s*['"]SUPABASE_ANON_KEY['"]\s*\)[^,]*,\s*\{\s*global\s*:\s*\{\s*headers\s*:\s*\{\s*Authorization\s*:[^}]+\}\s*,?\s*\}\s*,?\s*\}\s*,?\s*\)[ \t]*;?[ \t]*(?:\r?\n|$)"#,
    )
    .unwrap()
});

static GENERIC_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*const\s+([A-Za-z_$][\w$]*)\s*=\s*createClient\(").unwrap()
});

static STATEMENT_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*;?[ \t]*(?:\r?\n|$)").unwrap());

fn binding_match(caps: Option<Captures<'_>>) -> Match<ClientBinding> {
    caps.and_then(|caps| {
        let whole = caps.get(0)?;
        let var = caps.get(1)?.as_str().to_string();
        Some((Span::from(whole), ClientBinding { var }))
    })
    .into()
}

/// `createClient(` on separate lines reading the URL and service-role key
/// from `Deno.env.get`.
pub fn multiline_service_role(content: &str) -> Match<ClientBinding> {
    binding_match(MULTILINE_SERVICE_ROLE_RE.captures(content))
}

/// Intermediate `supabaseServiceKey` variable followed by
/// `createClient(supabaseUrl, supabaseServiceKey)`. Both lines belong to the
/// construction; the URL variable is left alone.
pub fn service_key_variable(content: &str) -> Match<ClientBinding> {
    binding_match(SERVICE_KEY_VAR_RE.captures(content))
}

/// `requireEnv('SUPABASE_SERVICE_ROLE_KEY')` followed by
/// `createClient(supabaseUrl, supabaseKey)`.
pub fn require_env(content: &str) -> Match<ClientBinding> {
    binding_match(REQUIRE_ENV_RE.captures(content))
}

/// Anon-key client forwarding the caller's `Authorization` header.
pub fn caller_scoped(content: &str) -> Match<ClientBinding> {
    binding_match(CALLER_SCOPED_RE.captures(content))
}

/// Any `const x = createClient(...);` statement occupying whole lines.
pub fn generic_statement(content: &str) -> Match<ClientBinding> {
    GENERIC_START_RE
        .captures_iter(content)
        .find_map(|caps| {
            let start = caps.get(0)?;
            let var = caps.get(1)?.as_str().to_string();
            let close = matching_close(content, start.end() - 1)?;
            let tail = STATEMENT_TAIL_RE.find(&content[close..])?;
            Some((
                Span::new(start.start(), close + tail.end()),
                ClientBinding { var },
            ))
        })
        .into()
}

/// Removal cascade, most specific shape first.
pub fn construction_cascade() -> [Recognizer<'static, ClientBinding>; 5] {
    [
        Recognizer::new("multi-line service role", multiline_service_role),
        Recognizer::new("service key variable", service_key_variable),
        Recognizer::new("requireEnv", require_env),
        Recognizer::new("caller-scoped", caller_scoped),
        Recognizer::new("generic", generic_statement),
    ]
}

/// Number of `createClient(` calls, ignoring imports, comments and
/// `ReturnType<typeof createClient>` type positions.
pub fn count_constructions(content: &str) -> usize {
    content
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.starts_with("import ") && !line.starts_with("//"))
        .map(|line| {
            let line = line.replace("ReturnType<typeof createClient>", "");
            line.matches("createClient(").count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::first_match;

    fn hit(content: &str) -> (&'static str, String, String) {
        let hit = first_match(content, &construction_cascade()).unwrap();
        (
            hit.recognizer,
            hit.captures.var,
            hit.span.slice(content).to_string(),
        )
    }

    #[test]
    fn test_multiline_service_role() {
        let src = "  try {\n    const supabaseClient = createClient(\n      Deno.env.get('SUPABASE_URL') ?? '',\n      Deno.env.get('SUPABASE_SERVICE_ROLE_KEY') ?? ''\n    );\n    run();\n";
        let (name, var, text) = hit(src);
        assert_eq!(name, "multi-line service role");
        assert_eq!(var, "supabaseClient");
        assert!(text.starts_with("    const supabaseClient"));
        assert!(text.ends_with("    );\n"));
    }

    #[test]
    fn test_service_key_variable_keeps_url_line() {
        let src = "    const supabaseUrl = Deno.env.get('SUPABASE_URL')!;\n    const supabaseServiceKey = Deno.env.get('SUPABASE_SERVICE_ROLE_KEY')!;\n    const supabase = createClient(supabaseUrl, supabaseServiceKey);\n\n";
        let (name, var, text) = hit(src);
        assert_eq!(name, "service key variable");
        assert_eq!(var, "supabase");
        assert!(text.starts_with("    const supabaseServiceKey"));
        assert!(!text.contains("SUPABASE_URL"));
    }

    #[test]
    fn test_require_env() {
        let src = "const supabaseKey = requireEnv('SUPABASE_SERVICE_ROLE_KEY');\nconst supabase = createClient(supabaseUrl, supabaseKey);\n";
        let (name, var, text) = hit(src);
        assert_eq!(name, "requireEnv");
        assert_eq!(var, "supabase");
        assert_eq!(text, src);
    }

    #[test]
    fn test_caller_scoped_single_and_multi_line() {
        let multi = "    const supabaseClient = createClient(\n      Deno.env.get('SUPABASE_URL') ?? '',\n      Deno.env.get('SUPABASE_ANON_KEY') ?? '',\n      {\n        global: {\n          headers: { Authorization: req.headers.get('Authorization')! },\n        },\n      }\n    );\n";
        let (name, var, _) = hit(multi);
        assert_eq!(name, "caller-scoped");
        assert_eq!(var, "supabaseClient");

        let single = "const sb = createClient(Deno.env.get(\"SUPABASE_URL\")!, Deno.env.get(\"SUPABASE_ANON_KEY\")!, { global: { headers: { Authorization: auth } } });\n";
        let (name, var, text) = hit(single);
        assert_eq!(name, "caller-scoped");
        assert_eq!(var, "sb");
        assert_eq!(text, single);
    }

    #[test]
    fn test_generic_statement_with_nested_options() {
        let src = "  const admin = createClient(url, key, { auth: { persistSession: false } });\n  next();\n";
        let (name, var, text) = hit(src);
        assert_eq!(name, "generic");
        assert_eq!(var, "admin");
        assert_eq!(text, "  const admin = createClient(url, key, { auth: { persistSession: false } });\n");
    }

    #[test]
    fn test_generic_requires_whole_statement() {
        let src = "const admin = createClient(url, key).schema('x');\n";
        assert!(first_match(src, &construction_cascade()).is_none());
    }

    #[test]
    fn test_count_constructions() {
        let src = "import { createClient } from 'x';\ntype Db = ReturnType<typeof createClient>;\n// createClient(old)\nconst a = createClient(u, k);\nconst b = createClient(u, k2);\n";
        assert_eq!(count_constructions(src), 2);
    }
}
