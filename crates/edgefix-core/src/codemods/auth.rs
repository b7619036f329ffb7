use log::debug;

use super::{Codemod, CodemodContext, StepOutput};
use crate::canonical::AUTH_CALL_MARKER;
use crate::edit::{SourceEdit, apply_edits, delete_lines, indent_at};
use crate::error::Result;
use crate::patterns::body::user_id_cascade;
use crate::patterns::client::{ClientBinding, construction_cascade, count_constructions};
use crate::patterns::preflight::handler_end_cascade;
use crate::patterns::{Hit, first_match};
use crate::policy::Policy;

/// Injects the shared auth helper call, replacing a lone service-credential
/// client construction with the client the helper returns.
pub struct AuthInjection;

/// What to do with existing `createClient(...)` calls.
enum ClientPlan {
    /// Remove this construction and bind its variable from the helper.
    Replace(Hit<ClientBinding>),
    /// Leave constructions alone and insert a bare call.
    Bare { warning: Option<String> },
}

fn plan_clients(content: &str) -> ClientPlan {
    match count_constructions(content) {
        0 => ClientPlan::Bare { warning: None },
        1 => match first_match(content, &construction_cascade()) {
            Some(hit) => ClientPlan::Replace(hit),
            None => ClientPlan::Bare {
                warning: Some("createClient call has an unrecognized shape; left in place".into()),
            },
        },
        n => ClientPlan::Bare {
            warning: Some(format!("{n} createClient calls; left in place")),
        },
    }
}

impl Codemod for AuthInjection {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn apply(&self, ctx: &CodemodContext<'_>, content: &str) -> Result<StepOutput> {
        if content.contains(AUTH_CALL_MARKER) {
            return Ok(StepOutput::unchanged().skipped("auth helper already awaited"));
        }
        let Some(call) = ctx.policy.auth_call() else {
            return Ok(StepOutput::unchanged().skipped("CORS-only function"));
        };

        let anchor = match ctx.policy {
            Policy::UserScopedAuth => first_match(content, &user_id_cascade()),
            _ => first_match(content, &handler_end_cascade()),
        };
        let Some(anchor) = anchor else {
            let message = match ctx.policy {
                Policy::UserScopedAuth => "no user_id body extraction found; auth not added",
                _ => "no OPTIONS block found; auth not added",
            };
            return Ok(StepOutput::unchanged().warning(message));
        };
        debug!("Auth anchored after '{}'", anchor.recognizer);

        let mut edits = Vec::new();
        let mut output = StepOutput::unchanged();
        let statement = match plan_clients(content) {
            ClientPlan::Replace(hit) => {
                edits.push(delete_lines(content, hit.span.start, hit.span.end));
                output = output.applied(format!(
                    "removed {} client construction `{}`",
                    hit.recognizer, hit.captures.var
                ));
                format!("const {{ serviceClient: {} }} = await {call};", hit.captures.var)
            }
            ClientPlan::Bare { warning } => {
                if let Some(warning) = warning {
                    output = output.warning(warning);
                }
                format!("await {call};")
            }
        };

        let indent = indent_at(content, anchor.span.start);
        edits.push(SourceEdit::insert(anchor.span.end, format!("\n{indent}{statement}")));

        let updated = apply_edits(content, edits)?;
        output.content = Some(updated);
        Ok(output.applied(format!("inserted `{statement}`")))
    }
}
