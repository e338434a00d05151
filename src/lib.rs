//! callfence - kernel-enforced syscall filtering for the current process.
//!
//! This library installs a seccomp filter for the embedding process on
//! Linux, as a defense-in-depth layer: even if the process is compromised,
//! the kernel refuses any syscall outside the allowed set. The policy that
//! gets installed is chosen through a precedence chain:
//!
//! ```text
//! policy values from configuration        (highest)
//!   > application-registered policy
//!     > built-in default policy           (a simple blacklist)
//! ```
//!
//! # Modules
//!
//! - `policy` - policy values, the process-wide registry, resolution
//! - `config` - the runtime configuration surface (enabled toggle + overrides)
//! - `filter` - best-effort installation through the libseccomp backend
//!
//! # Quick Start
//!
//! ```ignore
//! use callfence::{Action, Config, Policy, SyscallGroup};
//!
//! // Optionally register an application-specific policy during startup.
//! callfence::must_register_policy(Policy {
//!     default_action: Action::Allow,
//!     syscalls: vec![SyscallGroup::new(Action::Errno, &["ptrace", "mount"])],
//! });
//!
//! // Later, once configuration is loaded, install the filter.
//! let config = Config::new(serde_json::json!({ "enabled": true }));
//! callfence::load_filter(Some(&config))?;
//! ```
//!
//! Loading is non-fatal by design: kernel or platform unavailability is
//! logged and the process keeps running unfiltered. The only error
//! [`load_filter`] returns is a configuration validation failure.

pub mod config;
pub mod filter;
pub mod policy;

// Re-export commonly used types at crate root for convenience
pub use config::Config;
pub use filter::{Filter, InstallOutcome, SkipReason};
pub use policy::{
    Action, ArgCondition, CmpOp, Policy, PolicyError, PolicyRegistry, RegisterError, SyscallGroup,
};

use lazy_static::lazy_static;

lazy_static! {
    /// The registry behind the process-level entry points.
    static ref REGISTRY: PolicyRegistry = PolicyRegistry::new();
}

/// Register an application-specific seccomp policy to use instead of the
/// built-in default.
///
/// Call this once, during startup, before any filter is loaded. Panics if a
/// policy has already been registered for this process or if the policy
/// cannot be assembled into a valid kernel program - both indicate a bug in
/// the embedder's startup code, not a runtime condition.
pub fn must_register_policy(policy: Policy) {
    if let Err(err) = REGISTRY.try_register(policy) {
        panic!("{err}");
    }
}

/// Resolve the effective policy and install it as this process's syscall
/// filter.
///
/// Honors `config.enabled()` (absent means enabled), resolves the policy
/// through the precedence chain, and hands it to the installer. Kernel and
/// platform problems are logged, never returned; the only error this
/// function surfaces is a configuration validation failure, which the
/// caller should treat as a broken deployment configuration.
pub fn load_filter(config: Option<&Config>) -> Result<(), PolicyError> {
    load_filter_with(&REGISTRY, config)
}

/// [`load_filter`] against a caller-owned registry.
pub fn load_filter_with(
    registry: &PolicyRegistry,
    config: Option<&Config>,
) -> Result<(), PolicyError> {
    if let Some(config) = config {
        if !config.enabled() {
            return Ok(());
        }
    }

    let resolved = policy::resolver::resolve(registry, config)?;
    let outcome = filter::install(resolved.as_ref());
    filter::log_outcome(&outcome, resolved.as_ref());
    Ok(())
}
