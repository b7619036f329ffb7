use super::{Codemod, CodemodContext, StepOutput};
use crate::canonical::ORIGIN_LINE;
use crate::edit::{SourceEdit, apply_edits, indent_at};
use crate::error::Result;
use crate::patterns::origin::find_origin_lines;

/// Leaves exactly one canonical `const origin = ...` line in the handler.
pub struct OriginNormalization;

impl Codemod for OriginNormalization {
    fn name(&self) -> &'static str {
        "origin"
    }

    fn apply(&self, ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
        let lines = find_origin_lines(content);

        let Some((first, rest)) = lines.split_first() else {
            let Some(entry) = ctx.anchors.entry_point.find(content) else {
                return Ok(StepOutput::unchanged()
                    .warning("handler entry point not found; origin line not inserted"));
            };
            let indent = indent_at(content, entry.start());
            let edit = SourceEdit::insert(entry.end(), format!("\n{indent}  {ORIGIN_LINE}"));
            let updated = apply_edits(content, vec![edit])?;
            return Ok(StepOutput::changed(updated).applied("inserted origin extraction"));
        };

        let mut edits: Vec<SourceEdit> = rest
            .iter()
            .map(|line| SourceEdit::delete(line.line.start, line.line.end))
            .collect();
        let normalized = !first.is_canonical(content);
        if normalized {
            edits.push(SourceEdit::replace(
                first.statement.start,
                first.statement.end,
                ORIGIN_LINE,
            ));
        }

        if edits.is_empty() {
            return Ok(StepOutput::unchanged().skipped("origin extraction already canonical"));
        }

        let updated = apply_edits(content, edits)?;
        let mut output = StepOutput::changed(updated);
        if normalized {
            output = output.applied("normalized origin extraction");
        }
        if !rest.is_empty() {
            output = output.applied(format!("removed {} duplicate origin line(s)", rest.len()));
        }
        Ok(output)
    }
}
