//! Process-wide policy registry.
//!
//! The registry holds exactly two cells: the build-time default policy and
//! an application-registered policy that can be set at most once for the
//! process lifetime. There is no unregistration - once set, the registered
//! policy stands until the process exits.
//!
//! Registration is expected to happen during single-threaded startup, before
//! any filter is loaded. The one-shot slot still makes the contract explicit
//! under concurrent misuse: the first caller wins and every later caller
//! gets [`RegisterError::AlreadyRegistered`], which the public entry point
//! turns into a panic. A double registration is a bug in the embedder's
//! startup code, not a runtime condition.

use std::fmt;
use std::sync::OnceLock;

use super::default::default_policy;
use super::types::{Policy, PolicyError};

/// Registry for the process's syscall filter policies.
///
/// [`crate::load_filter`] reads the process-global instance; embedders that
/// manage their own startup sequence (and tests) can own one directly and
/// use [`crate::load_filter_with`].
pub struct PolicyRegistry {
    /// Fixed at construction, never mutated.
    default: Option<Policy>,
    /// Set at most once, via `try_register`.
    registered: OnceLock<Policy>,
}

impl PolicyRegistry {
    /// A registry carrying the built-in default policy (where the target
    /// defines one).
    pub fn new() -> Self {
        Self {
            default: default_policy(),
            registered: OnceLock::new(),
        }
    }

    /// A registry with no default policy. With nothing registered either,
    /// resolution yields no policy and filter loading becomes a no-op.
    pub fn without_default() -> Self {
        Self {
            default: None,
            registered: OnceLock::new(),
        }
    }

    /// Register an application policy, replacing the default in the
    /// precedence chain.
    ///
    /// Fails if a policy was already registered or if `policy` cannot be
    /// assembled into a valid kernel program. On failure the slot is left
    /// untouched.
    pub fn try_register(&self, policy: Policy) -> Result<(), RegisterError> {
        if self.registered.get().is_some() {
            return Err(RegisterError::AlreadyRegistered);
        }
        policy.validate().map_err(RegisterError::Invalid)?;
        self.registered
            .set(policy)
            .map_err(|_| RegisterError::AlreadyRegistered)
    }

    /// The registered policy, if one was set.
    pub fn registered(&self) -> Option<&Policy> {
        self.registered.get()
    }

    /// The build-time default policy, if the target defines one.
    pub fn default_policy(&self) -> Option<&Policy> {
        self.default.as_ref()
    }

    /// The base policy for resolution: registered if set, else the default,
    /// else nothing.
    pub fn effective_base(&self) -> Option<&Policy> {
        self.registered.get().or(self.default.as_ref())
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a registration attempt was refused.
///
/// Both variants indicate programmer misuse; [`crate::must_register_policy`]
/// panics on them rather than letting startup continue with a policy other
/// than the one the embedder intended.
#[derive(Debug)]
pub enum RegisterError {
    /// A policy was already registered for this process.
    AlreadyRegistered,
    /// The policy cannot be assembled into a valid kernel program.
    Invalid(PolicyError),
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::AlreadyRegistered => {
                write!(f, "a seccomp policy is already registered")
            }
            RegisterError::Invalid(err) => {
                write!(f, "failed to register seccomp policy: {err}")
            }
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegisterError::Invalid(err) => Some(err),
            RegisterError::AlreadyRegistered => None,
        }
    }
}
