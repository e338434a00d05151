//! The built-in default policy.
//!
//! A simple blacklist: everything is allowed except a set of syscalls that
//! load kernel code, reshape the mount tree, or poke other processes -
//! capabilities no ordinary long-running service needs after startup.
//! Embedders with tighter requirements register their own policy instead.

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
use super::types::{Action, Policy, SyscallGroup};

/// Default policy for the running target, if one is defined.
///
/// Only Linux on x86_64 and aarch64 carries a default; everywhere else this
/// returns `None` and resolution without a registered policy yields no
/// filter at all.
#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
pub(crate) fn default_policy() -> Option<Policy> {
    Some(Policy {
        default_action: Action::Allow,
        syscalls: vec![SyscallGroup::new(
            Action::Errno,
            &[
                // === Kernel code loading ===
                "delete_module",
                "finit_module",
                "init_module",
                "kexec_file_load",
                "kexec_load",
                // === Mount tree and root manipulation ===
                "chroot",
                "mount",
                "pivot_root",
                "umount2",
                // === Other-process introspection ===
                "process_vm_readv",
                "process_vm_writev",
                "ptrace",
                // === Kernel keyring ===
                "add_key",
                "keyctl",
                "request_key",
                // === Host state ===
                "reboot",
                "swapoff",
                "swapon",
                "userfaultfd",
            ],
        )],
    })
}

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
pub(crate) fn default_policy() -> Option<crate::policy::Policy> {
    None
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64"),
    test
))]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_a_blacklist() {
        let policy = default_policy().unwrap();
        assert_eq!(policy.default_action, Action::Allow);
        assert_eq!(policy.syscalls.len(), 1);

        let group = &policy.syscalls[0];
        assert_eq!(group.action, Action::Errno);
        assert!(group.names.contains(&"ptrace".to_string()));
        assert!(group.names.contains(&"init_module".to_string()));
        assert!(group.names.contains(&"mount".to_string()));
    }

    #[test]
    fn test_default_policy_assembles() {
        let policy = default_policy().unwrap();
        assert!(policy.validate().is_ok());
    }
}
