//! Syscall filter policy values.
//!
//! A [`Policy`] describes a complete seccomp filter in abstract terms: a
//! default action applied to every syscall not listed, plus rule groups that
//! override the default for specific syscalls (optionally gated on syscall
//! argument values). The policy is a plain data value - assembling it into a
//! kernel-loadable program is the backend's job.
//!
//! Policies decode from configuration with serde, using the same snake_case
//! action vocabulary most seccomp policy files use (`"allow"`, `"errno"`,
//! `"kill"`, ...).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What the kernel does when a syscall matches (or, for the default action,
/// when no rule matches).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Let the syscall through.
    Allow,
    /// Fail the syscall with `EPERM` without executing it.
    Errno,
    /// Kill the calling thread.
    Kill,
    /// Kill the whole process.
    KillProcess,
    /// Deliver `SIGSYS` to the calling thread.
    Trap,
    /// Allow after logging (kernel audit log).
    Log,
    /// Notify an attached tracer, or fail with `ENOSYS` if there is none.
    Trace,
}

/// Comparison operator for a syscall argument condition.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Compare `argument & mask` against the value. Requires
    /// [`ArgCondition::mask`].
    MaskedEq,
}

/// A condition on one of the six syscall argument registers.
///
/// When a group carries conditions, its action only applies to invocations
/// whose arguments satisfy every condition; other invocations fall through
/// to the default action.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArgCondition {
    /// Argument index, 0 through 5.
    pub arg: u8,
    pub op: CmpOp,
    pub value: u64,
    /// Mask applied to the argument before comparing. Only meaningful with
    /// [`CmpOp::MaskedEq`].
    #[serde(default)]
    pub mask: Option<u64>,
}

/// A rule group: one action applied to a set of syscalls, identified by name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SyscallGroup {
    /// Action taken when a syscall in this group is invoked.
    pub action: Action,
    /// Syscall names this group applies to (e.g. `["read", "write"]`).
    /// Names are resolved to numbers for the running architecture at
    /// assembly time.
    pub names: Vec<String>,
    /// Argument conditions, applied to every syscall in the group.
    #[serde(default)]
    pub args: Vec<ArgCondition>,
}

impl SyscallGroup {
    /// Build an unconditional group from a list of names.
    pub fn new(action: Action, names: &[&str]) -> Self {
        Self {
            action,
            names: names.iter().map(|n| n.to_string()).collect(),
            args: Vec::new(),
        }
    }
}

/// A complete syscall filter policy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Action applied to any syscall not listed in `syscalls`.
    pub default_action: Action,
    /// Rule groups overriding the default action for specific syscalls.
    pub syscalls: Vec<SyscallGroup>,
}

impl Default for Policy {
    /// The empty policy: deny-by-errno with no rules. This is the base a
    /// configuration override is decoded onto when neither a registered nor
    /// a built-in policy exists.
    fn default() -> Self {
        Self {
            default_action: Action::Errno,
            syscalls: Vec::new(),
        }
    }
}

impl Policy {
    /// Check that the policy can be deterministically assembled into a
    /// kernel program.
    ///
    /// Rejects groups with no names, syscalls listed more than once
    /// (conflicting rules), malformed argument conditions, and - on Linux,
    /// where the backend's syscall table is available - names the backend
    /// cannot resolve.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for group in &self.syscalls {
            if group.names.is_empty() {
                return Err(PolicyError::EmptyGroup);
            }
            for name in &group.names {
                if !seen.insert(name.as_str()) {
                    return Err(PolicyError::DuplicateSyscall { name: name.clone() });
                }
                if !crate::filter::backend::syscall_exists(name) {
                    return Err(PolicyError::UnknownSyscall { name: name.clone() });
                }
            }
            for cond in &group.args {
                if cond.arg > 5 {
                    return Err(PolicyError::ArgIndexOutOfRange { arg: cond.arg });
                }
                if cond.op == CmpOp::MaskedEq && cond.mask.is_none() {
                    return Err(PolicyError::MissingMask { arg: cond.arg });
                }
            }
        }
        Ok(())
    }
}

/// A policy or configuration validation failure.
///
/// This is the recoverable error family: it signals a mistake in deployment
/// configuration or in a policy handed to the registry, never an
/// environmental condition.
#[derive(Debug)]
pub enum PolicyError {
    /// The configuration's override fields could not be decoded.
    Decode(serde_json::Error),
    /// A syscall name the backend cannot resolve.
    UnknownSyscall { name: String },
    /// The same syscall is listed in more than one rule.
    DuplicateSyscall { name: String },
    /// A rule group with no syscall names.
    EmptyGroup,
    /// An argument condition referencing a register past the sixth.
    ArgIndexOutOfRange { arg: u8 },
    /// A `masked_eq` condition without a mask.
    MissingMask { arg: u8 },
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Decode(err) => {
                write!(f, "invalid syscall filter configuration: {err}")
            }
            PolicyError::UnknownSyscall { name } => {
                write!(f, "unknown syscall in policy: {name}")
            }
            PolicyError::DuplicateSyscall { name } => {
                write!(f, "syscall {name} is listed more than once")
            }
            PolicyError::EmptyGroup => {
                write!(f, "policy contains a syscall group with no names")
            }
            PolicyError::ArgIndexOutOfRange { arg } => {
                write!(f, "syscall argument index {arg} is out of range (0-5)")
            }
            PolicyError::MissingMask { arg } => {
                write!(f, "masked_eq condition on argument {arg} requires a mask")
            }
        }
    }
}

impl std::error::Error for PolicyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PolicyError::Decode(err) => Some(err),
            _ => None,
        }
    }
}
