use super::{Codemod, CodemodContext, StepOutput};
use crate::edit::{apply_edits, delete_lines};
use crate::error::Result;
use crate::patterns::headers::{headers_alias_lines, headers_constant};

/// Deletes the file-local `corsHeaders` table and any
/// `const corsHeaders = getCorsHeaders(origin);` alias.
pub struct HeadersConstRemoval;

impl Codemod for HeadersConstRemoval {
    fn name(&self) -> &'static str {
        "headers_const"
    }

    fn apply(&self, _ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
        let constant = headers_constant(content).span();
        let aliases = headers_alias_lines(content);

        if constant.is_none() && aliases.is_empty() {
            return Ok(StepOutput::unchanged().skipped("no local corsHeaders definition"));
        }

        let edits = constant
            .iter()
            .chain(aliases.iter())
            .map(|span| delete_lines(content, span.start, span.end))
            .collect();
        let updated = apply_edits(content, edits)?;

        let mut output = StepOutput::changed(updated);
        if constant.is_some() {
            output = output.applied("removed local corsHeaders table");
        }
        if !aliases.is_empty() {
            output = output.applied(format!("removed {} corsHeaders alias line(s)", aliases.len()));
        }
        Ok(output)
    }
}
