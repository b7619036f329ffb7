use super::{Codemod, CodemodContext, StepOutput};
use crate::canonical::{GET_CORS_HEADERS, JSON_WITH_CORS};
use crate::edit::{SourceEdit, apply_edits};
use crate::error::Result;
use crate::patterns::headers::{ResponseShape, count_headers_refs, response_header_sites};

/// Points every response at `getCorsHeaders(origin)` instead of the
/// file-local header table.
pub struct ResponseHeaders;

fn replacement(shape: ResponseShape) -> String {
    match shape {
        ResponseShape::Bare | ResponseShape::JsonOnly => format!("headers: {JSON_WITH_CORS}"),
        ResponseShape::SpreadFirst | ResponseShape::SpreadLast => JSON_WITH_CORS.to_string(),
        ResponseShape::TrailingArgument => format!(", {GET_CORS_HEADERS}(origin))"),
    }
}

impl Codemod for ResponseHeaders {
    fn name(&self) -> &'static str {
        "response_headers"
    }

    fn apply(&self, _ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
        let sites = response_header_sites(content);
        if sites.is_empty() {
            let leftover = count_headers_refs(content);
            if leftover > 0 {
                return Ok(StepOutput::unchanged().warning(format!(
                    "{leftover} corsHeaders reference(s) in unrecognized positions"
                )));
            }
            return Ok(StepOutput::unchanged().skipped("no corsHeaders response sites"));
        }

        let edits = sites
            .iter()
            .map(|(shape, span)| SourceEdit::replace(span.start, span.end, replacement(*shape)))
            .collect();
        let updated = apply_edits(content, edits)?;

        let mut output = StepOutput::changed(updated.clone())
            .applied(format!("rewrote headers at {} response site(s)", sites.len()));
        let leftover = count_headers_refs(&updated);
        if leftover > 0 {
            output = output.warning(format!(
                "{leftover} corsHeaders reference(s) remain in unrecognized positions"
            ));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemods::Outcome;
    use crate::codemods::test_support::{Harness, assert_idempotent, run};
    use crate::policy::Policy;

    #[test]
    fn test_rewrites_every_site() {
        let src = r#"  if (!body) {
    return new Response(JSON.stringify({ error: 'missing' }), { status: 400, headers: corsHeaders });
  }
  const res = new Response(JSON.stringify(data), { headers: { ...corsHeaders, 'Content-Type': 'application/json' } });
  return new Response(text, { headers: { "Content-Type": "application/json" } });
"#;
        let (out, outcomes) = run(&ResponseHeaders, Policy::PlainAuth, src);
        assert_eq!(
            out,
            r#"  if (!body) {
    return new Response(JSON.stringify({ error: 'missing' }), { status: 400, headers: { 'Content-Type': 'application/json', ...getCorsHeaders(origin) } });
  }
  const res = new Response(JSON.stringify(data), { headers: { 'Content-Type': 'application/json', ...getCorsHeaders(origin) } });
  return new Response(text, { headers: { 'Content-Type': 'application/json', ...getCorsHeaders(origin) } });
"#
        );
        assert_eq!(outcomes, [Outcome::Applied]);
        assert_eq!(count_headers_refs(&out), 0);
        assert_idempotent(&ResponseHeaders, Policy::PlainAuth, &out);
    }

    #[test]
    fn test_trailing_argument() {
        let src = "return rateLimited(result, corsHeaders);";
        let (out, _) = run(&ResponseHeaders, Policy::PlainAuth, src);
        assert_eq!(out, "return rateLimited(result, getCorsHeaders(origin));");
    }

    #[test]
    fn test_leftover_reference_warns() {
        let src = "const h = new Headers(corsHeaders);\nreturn new Response(x, { headers: corsHeaders });\n";
        let (out, outcomes) = run(&ResponseHeaders, Policy::PlainAuth, src);
        assert!(out.starts_with("const h = new Headers(corsHeaders);"));
        assert_eq!(outcomes, [Outcome::Applied, Outcome::Warning]);

        let (_, outcomes) = run(&ResponseHeaders, Policy::PlainAuth, "log(corsHeaders.x);\n");
        assert_eq!(outcomes, [Outcome::Warning]);
    }

    #[test]
    fn test_no_sites_is_a_neutral_skip() {
        let harness = Harness::new();
        let output = ResponseHeaders
            .apply(&harness.ctx(Policy::CorsOnly), "return new Response('hi');\n")
            .unwrap();
        assert_eq!(output.content, None);
        assert_eq!(
            output.notes,
            [(Outcome::Skipped, "no corsHeaders response sites".to_string())]
        );
    }
}
