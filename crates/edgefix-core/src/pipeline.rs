//! Ordered application of the codemods to one handler file.

use log::debug;

use crate::codemods::{
    AuthInjection, Codemod, CodemodContext, ErrorBoundary, HeadersConstRemoval,
    ImportNormalization, OriginNormalization, Outcome, PreflightCanonicalization,
    ResponseHeaders,
};
use crate::error::{CodemodError, Result};

/// One line of a file's audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNote {
    /// 1-based position of the step in the pipeline.
    pub step: usize,
    pub step_name: &'static str,
    pub outcome: Outcome,
    pub message: String,
}

/// Everything the pipeline reported for one file, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRecord {
    pub notes: Vec<ChangeNote>,
}

impl ChangeRecord {
    pub fn has_warnings(&self) -> bool {
        self.count(Outcome::Warning) > 0
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.notes.iter().filter(|n| n.outcome == outcome).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ChangeNote> {
        self.notes.iter().filter(|n| n.outcome == Outcome::Warning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub content: String,
    pub changed: bool,
    pub record: ChangeRecord,
}

pub struct Pipeline {
    codemods: Vec<Box<dyn Codemod>>,
}

impl Pipeline {
    pub fn new(codemods: Vec<Box<dyn Codemod>>) -> Self {
        Self { codemods }
    }

    /// The seven steps in their fixed order. Later steps rely on earlier
    /// ones: auth anchors on the canonical preflight block, and response
    /// rewriting assumes `origin` is in scope.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ImportNormalization),
            Box::new(HeadersConstRemoval),
            Box::new(OriginNormalization),
            Box::new(PreflightCanonicalization),
            Box::new(AuthInjection),
            Box::new(ResponseHeaders),
            Box::new(ErrorBoundary),
        ])
    }

    pub fn step_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codemods.iter().map(|c| c.name())
    }

    pub fn run(&self, ctx: &CodemodContext<'_>, source: &str) -> Result<PipelineOutput> {
        let mut content = source.to_string();
        let mut record = ChangeRecord::default();

        for (i, codemod) in self.codemods.iter().enumerate() {
            let output = codemod
                .apply(ctx, &content)
                .map_err(|source| CodemodError::Step {
                    step: codemod.name(),
                    source: Box::new(source),
                })?;

            debug!(
                "{}: step {} ({}) {}",
                ctx.identity,
                i + 1,
                codemod.name(),
                if output.content.is_some() { "changed" } else { "no change" }
            );

            record
                .notes
                .extend(output.notes.into_iter().map(|(outcome, message)| ChangeNote {
                    step: i + 1,
                    step_name: codemod.name(),
                    outcome,
                    message,
                }));
            if let Some(updated) = output.content {
                content = updated;
            }
        }

        Ok(PipelineOutput {
            changed: content != source,
            content,
            record,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemods::StepOutput;
    use crate::codemods::test_support::Harness;
    use crate::policy::Policy;

    struct Append(&'static str);

    impl Codemod for Append {
        fn name(&self) -> &'static str {
            "append"
        }

        fn apply(&self, _ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
            if content.ends_with(self.0) {
                return Ok(StepOutput::unchanged().skipped("present"));
            }
            Ok(StepOutput::changed(format!("{content}{}", self.0)).applied("appended"))
        }
    }

    struct Broken;

    impl Codemod for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn apply(&self, _ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
            crate::edit::apply_edits(content, vec![crate::edit::SourceEdit::delete(0, 99)])
                .map(StepOutput::changed)
        }
    }

    #[test]
    fn test_steps_thread_content_and_number_notes() {
        let harness = Harness::new();
        let pipeline = Pipeline::new(vec![Box::new(Append("a")), Box::new(Append("b"))]);
        let out = pipeline.run(&harness.ctx(Policy::PlainAuth), "x").unwrap();
        assert_eq!(out.content, "xab");
        assert!(out.changed);
        let steps: Vec<usize> = out.record.notes.iter().map(|n| n.step).collect();
        assert_eq!(steps, [1, 2]);
        assert_eq!(out.record.count(Outcome::Applied), 2);
    }

    #[test]
    fn test_step_error_names_the_step() {
        let harness = Harness::new();
        let pipeline = Pipeline::new(vec![Box::new(Broken)]);
        let err = pipeline.run(&harness.ctx(Policy::PlainAuth), "x").unwrap_err();
        assert!(matches!(err, CodemodError::Step { step: "broken", .. }));
    }

    #[test]
    fn test_standard_order() {
        let names: Vec<_> = Pipeline::standard().step_names().collect();
        assert_eq!(
            names,
            [
                "imports",
                "headers_const",
                "origin",
                "preflight",
                "auth",
                "response_headers",
                "error_boundary"
            ]
        );
    }
}
