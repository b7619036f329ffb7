//! Which authentication variant each function gets.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::config::Config;

/// Logical name of an edge function: the directory holding its handler.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionIdentity(String);

impl FunctionIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identity of the function owning `handler`, i.e. its parent directory.
    pub fn from_handler_path(handler: &Path) -> Option<Self> {
        let name = handler.parent()?.file_name()?.to_str()?;
        Some(Self::new(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Shared CORS plus `validateAuth(req)`.
    PlainAuth,
    /// Shared CORS plus `validateAuthWithUserId(req, user_id)`.
    UserScopedAuth,
    /// Shared CORS only; authentication is left alone.
    CorsOnly,
}

impl Policy {
    /// Name of the auth helper this policy calls, if any.
    pub fn auth_function(self) -> Option<&'static str> {
        match self {
            Policy::PlainAuth => Some("validateAuth"),
            Policy::UserScopedAuth => Some("validateAuthWithUserId"),
            Policy::CorsOnly => None,
        }
    }

    /// The call expression, without `await`.
    pub fn auth_call(self) -> Option<&'static str> {
        match self {
            Policy::PlainAuth => Some("validateAuth(req)"),
            Policy::UserScopedAuth => Some("validateAuthWithUserId(req, user_id)"),
            Policy::CorsOnly => None,
        }
    }

    pub fn requires_auth(self) -> bool {
        self != Policy::CorsOnly
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Policy::PlainAuth => "plain auth",
            Policy::UserScopedAuth => "user-scoped auth",
            Policy::CorsOnly => "CORS only",
        };
        f.write_str(s)
    }
}

/// Maps function identities to policies.
pub trait ResolvePolicy {
    /// Excluded functions are never read or written.
    fn is_excluded(&self, identity: &FunctionIdentity) -> bool;

    fn resolve(&self, identity: &FunctionIdentity) -> Policy;
}

/// Table-driven resolver over the configured name sets.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    excluded: BTreeSet<String>,
    user_scoped: BTreeSet<String>,
    cors_only: BTreeSet<String>,
}

impl StaticPolicy {
    pub fn new<I, S>(excluded: I, user_scoped: I, cors_only: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
            user_scoped: user_scoped.into_iter().map(Into::into).collect(),
            cors_only: cors_only.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.excluded.iter().cloned(),
            config.user_scoped.iter().cloned(),
            config.cors_only.iter().cloned(),
        )
    }
}

impl ResolvePolicy for StaticPolicy {
    fn is_excluded(&self, identity: &FunctionIdentity) -> bool {
        self.excluded.contains(identity.as_str())
    }

    fn resolve(&self, identity: &FunctionIdentity) -> Policy {
        if self.user_scoped.contains(identity.as_str()) {
            Policy::UserScopedAuth
        } else if self.cors_only.contains(identity.as_str()) {
            Policy::CorsOnly
        } else {
            Policy::PlainAuth
        }
    }
}
