//! Effective-policy resolution.
//!
//! Resolution applies the precedence chain (config overrides beat the
//! registered policy, which beats the built-in default) and is a pure
//! computation: it only reads the registry and returns a fresh policy
//! value, never mutating shared state.

use crate::config::Config;

use super::registry::PolicyRegistry;
use super::types::{Policy, PolicyError};

/// Compute the effective policy for the given configuration.
///
/// 1. The base is the registry's registered policy if set, else its default
///    (which may not exist).
/// 2. Without a config, or with a config carrying neither `default_action`
///    nor `syscalls`, the base is returned unchanged - possibly `None`,
///    which is a legitimate "no filter" state.
/// 3. With override fields present, they are decoded onto a copy of the base
///    (or onto the empty policy if there is no base) and the merged result
///    is validated.
///
/// Errors are configuration validation failures only: malformed override
/// types, unknown syscall names, conflicting rules.
pub fn resolve(
    registry: &PolicyRegistry,
    config: Option<&Config>,
) -> Result<Option<Policy>, PolicyError> {
    let base = registry.effective_base();

    let config = match config {
        Some(c) if c.has_field("default_action") || c.has_field("syscalls") => c,
        _ => return Ok(base.cloned()),
    };

    let mut policy = base.cloned().unwrap_or_default();
    config.unpack(&mut policy)?;
    policy.validate()?;
    Ok(Some(policy))
}
