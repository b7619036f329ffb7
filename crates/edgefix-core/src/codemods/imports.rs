use log::debug;

use super::{Codemod, CodemodContext, StepOutput};
use crate::canonical::{self, AUTH_MODULE, CORS_MODULE, GET_CORS_HEADERS, HANDLE_PREFLIGHT};
use crate::edit::{SourceEdit, apply_edits, line_end_inclusive};
use crate::error::Result;
use crate::patterns::imports::{find_module_import, last_import_line};

/// Ensures the shared CORS helpers, and the auth helper the policy calls,
/// are imported.
pub struct ImportNormalization;

impl ImportNormalization {
    fn required(ctx: &CodemodContext<'_>) -> Vec<(&'static str, Vec<&'static str>)> {
        let mut required = vec![(CORS_MODULE, vec![GET_CORS_HEADERS, HANDLE_PREFLIGHT])];
        if let Some(auth) = ctx.policy.auth_function() {
            required.push((AUTH_MODULE, vec![auth]));
        }
        required
    }

    /// Offset of the line following the anchor import.
    fn insertion_point(ctx: &CodemodContext<'_>, content: &str) -> Option<usize> {
        let anchor_end = match ctx.anchors.import.find(content) {
            Some(m) => m.end(),
            None => {
                debug!("No serve import, falling back to the last import line");
                last_import_line(content)?.end
            }
        };
        Some(line_end_inclusive(content, anchor_end.saturating_sub(1)))
    }
}

impl Codemod for ImportNormalization {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn apply(&self, ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
        let mut edits = Vec::new();
        let mut messages = Vec::new();
        let mut new_lines = Vec::new();

        for (module, names) in Self::required(ctx) {
            match find_module_import(content, module) {
                Some(import) => {
                    let missing: Vec<&str> = names
                        .into_iter()
                        .filter(|name| !import.has_name(content, name))
                        .collect();
                    if missing.is_empty() {
                        continue;
                    }
                    let at = import.append_point(content);
                    edits.push(SourceEdit::insert(at, format!(", {}", missing.join(", "))));
                    messages.push(format!("added {} to the {module} import", missing.join(", ")));
                }
                None => {
                    new_lines.push(canonical::import_line(&names, module));
                }
            }
        }

        let mut output = StepOutput::unchanged();
        if !new_lines.is_empty() {
            match Self::insertion_point(ctx, content) {
                Some(at) => {
                    let block = new_lines.join("\n");
                    let text = if at == content.len() && !content.ends_with('\n') {
                        format!("\n{block}")
                    } else {
                        format!("{block}\n")
                    };
                    edits.push(SourceEdit::insert(at, text));
                    messages.extend(new_lines.iter().map(|line| format!("inserted `{line}`")));
                }
                None => {
                    output = output.warning(format!(
                        "no import to anchor on; could not add {}",
                        new_lines.join(" and ")
                    ));
                }
            }
        }

        if edits.is_empty() {
            if output.notes.is_empty() {
                output = output.skipped("shared helper imports already present");
            }
            return Ok(output);
        }

        let updated = apply_edits(content, edits)?;
        let mut output = StepOutput {
            content: Some(updated),
            notes: output.notes,
        };
        for message in messages {
            output = output.applied(message);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemods::Outcome;
    use crate::codemods::test_support::{assert_idempotent, run};
    use crate::policy::Policy;

    const HEADER: &str = "import { serve } from 'https://deno.land/std@0.168.0/http/server.ts';\nimport { createClient } from 'https://esm.sh/@supabase/supabase-js@2';\n\nserve(async (req) => {});\n";

    #[test]
    fn test_inserts_after_serve_import() {
        let (out, outcomes) = run(&ImportNormalization, Policy::PlainAuth, HEADER);
        assert_eq!(
            out,
            "import { serve } from 'https://deno.land/std@0.168.0/http/server.ts';\n\
             import { getCorsHeaders, handleCorsPreflightRequest } from '../_shared/cors-config.ts';\n\
             import { validateAuth } from '../_shared/auth.ts';\n\
             import { createClient } from 'https://esm.sh/@supabase/supabase-js@2';\n\nserve(async (req) => {});\n"
        );
        assert_eq!(outcomes, [Outcome::Applied, Outcome::Applied]);
        assert_idempotent(&ImportNormalization, Policy::PlainAuth, &out);
    }

    #[test]
    fn test_policy_selects_auth_import() {
        let (out, _) = run(&ImportNormalization, Policy::UserScopedAuth, HEADER);
        assert!(out.contains("import { validateAuthWithUserId } from '../_shared/auth.ts';"));

        let (out, _) = run(&ImportNormalization, Policy::CorsOnly, HEADER);
        assert!(!out.contains("auth.ts"));
        assert!(out.contains("cors-config.ts"));
    }

    #[test]
    fn test_extends_partial_import() {
        let src = "import { getCorsHeaders } from \"../_shared/cors-config.ts\";\nimport { validateAuth } from '../_shared/auth.ts';\n";
        let (out, outcomes) = run(&ImportNormalization, Policy::PlainAuth, src);
        assert_eq!(
            out,
            "import { getCorsHeaders, handleCorsPreflightRequest } from \"../_shared/cors-config.ts\";\nimport { validateAuth } from '../_shared/auth.ts';\n"
        );
        assert_eq!(outcomes, [Outcome::Applied]);
    }

    #[test]
    fn test_falls_back_to_last_import() {
        let src = "import { a } from './a.ts';\nimport b from './b.ts';\n\nDeno.serve(async (req) => {});\n";
        let (out, _) = run(&ImportNormalization, Policy::CorsOnly, src);
        assert_eq!(
            out,
            "import { a } from './a.ts';\nimport b from './b.ts';\nimport { getCorsHeaders, handleCorsPreflightRequest } from '../_shared/cors-config.ts';\n\nDeno.serve(async (req) => {});\n"
        );
    }

    #[test]
    fn test_no_anchor_warns() {
        let src = "Deno.serve(async (req) => new Response('ok'));\n";
        let (out, outcomes) = run(&ImportNormalization, Policy::PlainAuth, src);
        assert_eq!(out, src);
        assert_eq!(outcomes, [Outcome::Warning]);
    }

    #[test]
    fn test_present_imports_are_skipped() {
        let src = "import { getCorsHeaders, handleCorsPreflightRequest } from '../_shared/cors-config.ts';\nimport { validateAuth } from '../_shared/auth.ts';\n";
        let (out, outcomes) = run(&ImportNormalization, Policy::PlainAuth, src);
        assert_eq!(out, src);
        assert_eq!(outcomes, [Outcome::Skipped]);
    }
}
