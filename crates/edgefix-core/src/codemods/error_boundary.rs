use super::{Codemod, CodemodContext, StepOutput};
use crate::canonical::response_guard;
use crate::edit::{SourceEdit, apply_edits, indent_at};
use crate::error::Result;
use crate::patterns::catch::{CatchBlock, find_catch_blocks, response_guard as existing_guard};

/// Re-throws `Response` values thrown by the auth helper out of catch blocks
/// instead of turning them into 500s.
pub struct ErrorBoundary;

/// Indentation for the first statement of a catch body.
fn body_indent(content: &str, block: &CatchBlock) -> String {
    let first_line = content[block.body_start..]
        .lines()
        .find(|line| !line.trim().is_empty());
    match first_line {
        Some(line) if !line.trim_start().starts_with('}') => {
            let trimmed = line.trim_start_matches([' ', '\t']);
            line[..line.len() - trimmed.len()].to_string()
        }
        _ => format!("{}  ", indent_at(content, block.open)),
    }
}

impl Codemod for ErrorBoundary {
    fn name(&self) -> &'static str {
        "error_boundary"
    }

    fn apply(&self, ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
        if !ctx.policy.requires_auth() {
            return Ok(StepOutput::unchanged().skipped("CORS-only function"));
        }
        if existing_guard(content).is_some() {
            return Ok(StepOutput::unchanged().skipped("Response guard already present"));
        }

        let blocks = find_catch_blocks(content);
        if blocks.is_empty() {
            return Ok(StepOutput::unchanged().warning("no catch blocks found"));
        }

        let edits = blocks
            .iter()
            .map(|block| {
                let indent = body_indent(content, block);
                let guard = response_guard(&block.binding);
                SourceEdit::insert(block.body_start, format!("{indent}{guard}\n"))
            })
            .collect();
        let updated = apply_edits(content, edits)?;
        Ok(StepOutput::changed(updated)
            .applied(format!("guarded {} catch block(s)", blocks.len())))
    }
}
