//! Source-to-source migration of Supabase edge function handlers onto the
//! shared `_shared/cors-config.ts` and `_shared/auth.ts` helpers.
//!
//! The [`Pipeline`] threads one handler file through seven idempotent
//! [`Codemod`]s. Running it on its own output changes nothing.

pub mod canonical;
pub mod codemods;
pub mod config;
pub mod edit;
pub mod error;
pub mod patterns;
pub mod pipeline;
pub mod policy;
pub mod scan;

pub use codemods::{Codemod, CodemodContext, Outcome, StepOutput};
pub use config::{Anchors, Config};
pub use error::{CodemodError, ConfigError, Result};
pub use pipeline::{ChangeNote, ChangeRecord, Pipeline, PipelineOutput};
pub use policy::{FunctionIdentity, Policy, ResolvePolicy, StaticPolicy};
