//! Best-effort filter installation.
//!
//! Installing the filter is deliberately fail-open: the filter is a
//! defense-in-depth layer, and a host that cannot carry it (wrong platform,
//! kernel too old, kernel rejecting the program) must still run the
//! application. Every path through [`install`] therefore ends in an
//! [`InstallOutcome`] that the orchestrator logs and never converts into a
//! propagated failure.
//!
//! Once loaded with the privilege lock, a filter has no handle and cannot
//! be inspected or removed; the kernel only permits stacking stricter
//! filters on top.

pub mod backend;

use std::io;

use tracing::{debug, info, warn};

use crate::policy::types::Policy;

/// What gets handed to the kernel: the policy plus the two installation
/// flags.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Set no-new-privs before loading. Irrevocable; required to load a
    /// filter without `CAP_SYS_ADMIN`.
    pub lock_privileges: bool,
    /// Synchronize the filter onto every thread of the process, not just
    /// the calling one.
    pub all_threads: bool,
    pub policy: Policy,
}

/// Why installation did not happen. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a Linux build.
    UnsupportedPlatform,
    /// The running kernel has no seccomp support.
    KernelUnsupported,
    /// No policy was resolved from any source.
    NoPolicy,
}

/// The result of one installation attempt.
#[derive(Debug)]
pub enum InstallOutcome {
    /// The kernel accepted the filter; it now applies to every thread.
    Installed,
    /// Nothing was attempted.
    Skipped(SkipReason),
    /// The kernel call was attempted and failed; the process continues
    /// running without the filter.
    Failed(io::Error),
}

/// Attempt to install `policy` as this process's syscall filter.
///
/// The filter is always loaded with the privilege lock and the all-threads
/// flag. A `None` policy is a legitimate no-op, not an error. This function
/// never panics and never propagates an error; inspect the outcome, or let
/// [`log_outcome`] report it.
pub fn install(policy: Option<&Policy>) -> InstallOutcome {
    if cfg!(not(target_os = "linux")) {
        return InstallOutcome::Skipped(SkipReason::UnsupportedPlatform);
    }

    if !backend::supported() {
        return InstallOutcome::Skipped(SkipReason::KernelUnsupported);
    }

    let policy = match policy {
        Some(p) => p,
        None => return InstallOutcome::Skipped(SkipReason::NoPolicy),
    };

    let filter = Filter {
        lock_privileges: true,
        all_threads: true,
        policy: policy.clone(),
    };

    debug!(filter = ?filter, "loading syscall filter");
    match backend::load(&filter) {
        Ok(()) => InstallOutcome::Installed,
        Err(err) => InstallOutcome::Failed(err),
    }
}

/// Report an installation outcome at the level the outcome warrants.
///
/// Skips are debug chatter (or a single info line when the kernel lacks
/// seccomp), failures are warnings carrying the error and the attempted
/// policy, success is an info line.
pub fn log_outcome(outcome: &InstallOutcome, policy: Option<&Policy>) {
    match outcome {
        InstallOutcome::Skipped(SkipReason::UnsupportedPlatform) => {
            debug!("syscall filtering is only supported on Linux");
        }
        InstallOutcome::Skipped(SkipReason::KernelUnsupported) => {
            info!("syscall filter not installed because the kernel does not support seccomp");
        }
        InstallOutcome::Skipped(SkipReason::NoPolicy) => {
            debug!("no seccomp policy is defined");
        }
        InstallOutcome::Failed(err) => {
            warn!(error = %err, policy = ?policy, "syscall filter could not be installed");
        }
        InstallOutcome::Installed => {
            info!("syscall filter successfully installed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::types::{Action, SyscallGroup};

    /// No resolved policy: nothing reaches the kernel, on any platform.
    #[test]
    fn test_install_without_policy_skips() {
        let outcome = install(None);
        #[cfg(target_os = "linux")]
        assert!(matches!(
            outcome,
            InstallOutcome::Skipped(SkipReason::NoPolicy)
        ));
        #[cfg(not(target_os = "linux"))]
        assert!(matches!(
            outcome,
            InstallOutcome::Skipped(SkipReason::UnsupportedPlatform)
        ));
    }

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn test_install_skips_off_linux_for_any_policy() {
        let policy = Policy {
            default_action: Action::Allow,
            syscalls: vec![SyscallGroup::new(Action::Errno, &["ptrace"])],
        };
        let outcome = install(Some(&policy));
        assert!(matches!(
            outcome,
            InstallOutcome::Skipped(SkipReason::UnsupportedPlatform)
        ));
    }

    /// Logging an outcome must not panic for any variant.
    #[test]
    fn test_log_outcome_covers_all_variants() {
        let policy = Policy {
            default_action: Action::Allow,
            syscalls: vec![SyscallGroup::new(Action::Errno, &["ptrace"])],
        };
        log_outcome(&InstallOutcome::Installed, Some(&policy));
        log_outcome(&InstallOutcome::Skipped(SkipReason::UnsupportedPlatform), None);
        log_outcome(&InstallOutcome::Skipped(SkipReason::KernelUnsupported), None);
        log_outcome(&InstallOutcome::Skipped(SkipReason::NoPolicy), None);
        log_outcome(
            &InstallOutcome::Failed(std::io::Error::new(std::io::ErrorKind::Other, "boom")),
            Some(&policy),
        );
    }
}
