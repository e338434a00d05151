//! Integration test for the process-global entry points.
//!
//! Everything lives in one test function because the global registry is
//! process-lifetime state and, on Linux, `load_filter` really installs a
//! filter into this test process. Cargo gives each integration test file
//! its own process, so none of this leaks into other tests.

use std::panic::{catch_unwind, AssertUnwindSafe};

use callfence::{load_filter, must_register_policy, Action, Config, Policy, SyscallGroup};
use serde_json::json;

#[test]
fn test_global_register_and_load() {
    // An allow-everything policy with one deny rule: installing it must not
    // disturb the rest of this test process.
    let policy = Policy {
        default_action: Action::Allow,
        syscalls: vec![SyscallGroup::new(Action::Errno, &["kexec_load"])],
    };
    must_register_policy(policy);

    // A second registration is a contract violation and panics, regardless
    // of the new policy's validity.
    let again = Policy {
        default_action: Action::Allow,
        syscalls: Vec::new(),
    };
    let result = catch_unwind(AssertUnwindSafe(|| must_register_policy(again)));
    assert!(result.is_err(), "second registration must panic");

    // Loading with an override-free config installs the registered policy.
    // On non-Linux targets this is a logged no-op; either way it is Ok.
    let config = Config::new(json!({ "enabled": true }));
    load_filter(Some(&config)).expect("load_filter should only fail on config errors");

    // The process is still healthy behind the filter: ordinary syscalls
    // (time, filesystem metadata) pass through the allow default.
    assert!(std::process::id() > 0);
    assert!(std::fs::metadata("/").is_ok());

    // A repeat invocation is not guarded against and stays non-fatal.
    load_filter(Some(&config)).expect("repeat load_filter must still succeed");
}
