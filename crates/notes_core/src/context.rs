//! Per-request actor context.
//!
//! # Responsibility
//! - Resolve the actor attributed with an operation, once per unit of work.
//!
//! # Invariants
//! - The actor is never blank; absent or blank input resolves to `system`.
//! - A context is owned by one unit of work and passed explicitly, so one
//!   request can never observe another request's actor.
//! - No identity verification happens here.

/// Actor used when no caller identity was supplied.
pub const SYSTEM_ACTOR: &str = "system";
/// Out-of-band field carrying the caller identity.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Actor binding for one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    actor: String,
}

impl RequestContext {
    /// Binds `actor` when it is non-blank, otherwise the `system` actor.
    pub fn new(actor: Option<&str>) -> Self {
        match actor {
            Some(value) if !value.trim().is_empty() => Self {
                actor: value.to_string(),
            },
            _ => Self::system(),
        }
    }

    pub fn system() -> Self {
        Self {
            actor: SYSTEM_ACTOR.to_string(),
        }
    }

    /// Resolves the actor from `(name, value)` header pairs.
    ///
    /// Header names compare case-insensitively; the first match wins.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let actor = headers
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(USER_ID_HEADER))
            .map(|(_, value)| value);
        Self::new(actor)
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::system()
    }
}
