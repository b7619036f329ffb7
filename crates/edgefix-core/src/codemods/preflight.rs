use log::debug;

use super::{Codemod, CodemodContext, StepOutput};
use crate::canonical::{PREFLIGHT_CALL, preflight_block};
use crate::edit::{SourceEdit, apply_edits, indent_at};
use crate::error::Result;
use crate::patterns::first_match;
use crate::patterns::preflight::{find_options_guards, inline_handler_cascade};

/// Replaces an inline OPTIONS response with a delegation to
/// `handleCorsPreflightRequest(origin)`.
pub struct PreflightCanonicalization;

impl Codemod for PreflightCanonicalization {
    fn name(&self) -> &'static str {
        "preflight"
    }

    fn apply(&self, _ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
        if content.contains(PREFLIGHT_CALL) {
            return Ok(StepOutput::unchanged().skipped("preflight already delegates"));
        }

        let Some(hit) = first_match(content, &inline_handler_cascade()) else {
            let guards = find_options_guards(content);
            let message = if guards.iter().any(|g| g.end.is_none()) {
                "OPTIONS block has unbalanced braces; left unchanged"
            } else if guards.is_empty() {
                "no OPTIONS preflight block found"
            } else {
                "OPTIONS block does not return a response; left unchanged"
            };
            return Ok(StepOutput::unchanged().warning(message));
        };

        debug!("Preflight matched by '{}' recognizer", hit.recognizer);
        let indent = indent_at(content, hit.span.start);
        let edit = SourceEdit::replace(hit.span.start, hit.span.end, preflight_block(indent));
        let updated = apply_edits(content, vec![edit])?;
        Ok(StepOutput::changed(updated).applied(format!(
            "replaced inline preflight handler ({})",
            hit.recognizer
        )))
    }
}
