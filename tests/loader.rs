//! Integration tests for the filter-loading flow.
//!
//! These run against caller-owned registries so they stay independent of
//! the process-global registry (exercised separately in `global_entry.rs`)
//! and of each other. Nothing here loads a real filter into the test
//! process; kernel installation is covered by the global entry point test.

use callfence::{
    load_filter_with, Action, Config, Policy, PolicyError, PolicyRegistry, SyscallGroup,
};
use serde_json::json;

fn registered_policy() -> Policy {
    Policy {
        default_action: Action::Allow,
        syscalls: vec![SyscallGroup::new(Action::Errno, &["ptrace", "mount"])],
    }
}

/// A disabled section is a successful no-op. The malformed `syscalls`
/// override proves the resolver is never consulted: decoding it would fail.
#[test]
fn test_disabled_config_is_a_silent_success() {
    let registry = PolicyRegistry::without_default();
    let config = Config::new(json!({ "enabled": false, "syscalls": 42 }));

    assert!(load_filter_with(&registry, Some(&config)).is_ok());
}

/// No registration, no default, no config: loading succeeds and installs
/// nothing.
#[test]
fn test_load_filter_without_any_policy_source() {
    let registry = PolicyRegistry::without_default();
    assert!(load_filter_with(&registry, None).is_ok());
}

/// A decode failure surfaces as the resolver's validation error, unchanged.
#[test]
fn test_decode_error_propagates() {
    let registry = PolicyRegistry::without_default();
    let config = Config::new(json!({ "syscalls": { "bogus": true } }));

    let result = load_filter_with(&registry, Some(&config));
    assert!(matches!(result, Err(PolicyError::Decode(_))));
}

/// Unknown syscall names in the configuration are a validation error, not
/// a deferred installation failure.
#[cfg(target_os = "linux")]
#[test]
fn test_unknown_syscall_in_config_is_an_error() {
    let registry = PolicyRegistry::without_default();
    let config = Config::new(json!({
        "syscalls": [{ "action": "allow", "names": ["not_a_real_syscall"] }],
    }));

    let result = load_filter_with(&registry, Some(&config));
    assert!(matches!(result, Err(PolicyError::UnknownSyscall { .. })));
}

/// Config overrides alone are enough to build the effective policy.
#[test]
fn test_config_builds_policy_from_scratch() {
    let registry = PolicyRegistry::without_default();
    let config = Config::new(json!({
        "enabled": true,
        "default_action": "kill",
        "syscalls": [{ "action": "allow", "names": ["read", "write"] }],
    }));

    let resolved = callfence::policy::resolver::resolve(&registry, Some(&config))
        .unwrap()
        .unwrap();
    assert_eq!(resolved.default_action, Action::Kill);
    assert_eq!(resolved.syscalls.len(), 1);
    assert_eq!(resolved.syscalls[0].action, Action::Allow);
    assert_eq!(resolved.syscalls[0].names, vec!["read", "write"]);
}

/// With a registered policy and an override-free config, resolution is the
/// identity function.
#[test]
fn test_registered_policy_passes_through_exactly() {
    let registry = PolicyRegistry::without_default();
    let registered = Policy {
        default_action: Action::Allow,
        syscalls: Vec::new(),
    };
    registry.try_register(registered.clone()).unwrap();

    let config = Config::new(json!({ "enabled": true }));
    let resolved = callfence::policy::resolver::resolve(&registry, Some(&config)).unwrap();
    assert_eq!(resolved, Some(registered));
}

/// Overrides beat the registered policy, which beats the default.
#[test]
fn test_precedence_chain() {
    let registry = PolicyRegistry::without_default();
    registry.try_register(registered_policy()).unwrap();

    let config = Config::new(json!({
        "default_action": "log",
        "syscalls": [{ "action": "errno", "names": ["ptrace"] }],
    }));

    let resolved = callfence::policy::resolver::resolve(&registry, Some(&config))
        .unwrap()
        .unwrap();
    assert_eq!(resolved.default_action, Action::Log);
    assert_eq!(resolved.syscalls.len(), 1);
    assert_eq!(resolved.syscalls[0].names, vec!["ptrace"]);
}
