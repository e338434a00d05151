//! Kernel-facing glue over libseccomp.
//!
//! Everything that touches the seccomp ABI lives here: probing kernel
//! support, resolving syscall names, assembling a [`Policy`] into a filter
//! context, and loading a [`Filter`] into the kernel. The rest of the crate
//! only sees `io::Error` values; libseccomp stays an implementation detail.
//!
//! On non-Linux targets this module is a stub: nothing is supported, names
//! cannot be resolved (and are accepted as-is by validation), and loading
//! fails with `Unsupported`.

#[cfg(target_os = "linux")]
pub use linux::{assemble, load, supported, syscall_exists};

#[cfg(target_os = "linux")]
mod linux {
    use std::io;

    use libseccomp::{
        ScmpAction, ScmpArgCompare, ScmpCompareOp, ScmpFilterContext, ScmpSyscall,
    };

    use crate::filter::Filter;
    use crate::policy::types::{Action, ArgCondition, CmpOp, Policy};

    /// Whether the running kernel has seccomp at all.
    pub fn supported() -> bool {
        // PR_GET_SECCOMP reports the current mode on any seccomp-capable
        // kernel and fails with EINVAL on kernels built without it.
        unsafe { libc::prctl(libc::PR_GET_SECCOMP, 0, 0, 0, 0) >= 0 }
    }

    /// Whether the backend can resolve the syscall name for this
    /// architecture.
    pub fn syscall_exists(name: &str) -> bool {
        ScmpSyscall::from_name(name).is_ok()
    }

    /// Assemble a policy into a loadable filter context.
    ///
    /// Fails on names the syscall table cannot resolve; everything else was
    /// already rejected by [`Policy::validate`].
    pub fn assemble(policy: &Policy) -> io::Result<ScmpFilterContext> {
        let mut ctx =
            ScmpFilterContext::new_filter(scmp_action(policy.default_action)).map_err(to_io)?;

        for group in &policy.syscalls {
            let action = scmp_action(group.action);
            let comparators: Vec<ScmpArgCompare> =
                group.args.iter().map(arg_compare).collect();
            for name in &group.names {
                let syscall = ScmpSyscall::from_name(name).map_err(to_io)?;
                if comparators.is_empty() {
                    ctx.add_rule(action, syscall).map_err(to_io)?;
                } else {
                    ctx.add_rule_conditional(action, syscall, &comparators)
                        .map_err(to_io)?;
                }
            }
        }
        Ok(ctx)
    }

    /// Assemble and load a filter into the kernel for this process.
    pub fn load(filter: &Filter) -> io::Result<()> {
        let mut ctx = assemble(&filter.policy)?;
        ctx.set_ctl_nnp(filter.lock_privileges).map_err(to_io)?;
        ctx.set_ctl_tsync(filter.all_threads).map_err(to_io)?;
        ctx.load().map_err(to_io)?;
        Ok(())
    }

    fn scmp_action(action: Action) -> ScmpAction {
        match action {
            Action::Allow => ScmpAction::Allow,
            Action::Errno => ScmpAction::Errno(libc::EPERM),
            Action::Kill => ScmpAction::KillThread,
            Action::KillProcess => ScmpAction::KillProcess,
            Action::Trap => ScmpAction::Trap,
            Action::Log => ScmpAction::Log,
            Action::Trace => ScmpAction::Trace(0),
        }
    }

    fn arg_compare(cond: &ArgCondition) -> ScmpArgCompare {
        let op = match cond.op {
            CmpOp::Eq => ScmpCompareOp::Equal,
            CmpOp::Ne => ScmpCompareOp::NotEqual,
            CmpOp::Lt => ScmpCompareOp::Less,
            CmpOp::Le => ScmpCompareOp::LessOrEqual,
            CmpOp::Gt => ScmpCompareOp::Greater,
            CmpOp::Ge => ScmpCompareOp::GreaterEqual,
            // validate() guarantees the mask is present
            CmpOp::MaskedEq => ScmpCompareOp::MaskedEqual(cond.mask.unwrap_or(u64::MAX)),
        };
        ScmpArgCompare::new(u32::from(cond.arg), op, cond.value)
    }

    fn to_io(err: libseccomp::error::SeccompError) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }

}

#[cfg(not(target_os = "linux"))]
pub use stub::{load, supported, syscall_exists};

#[cfg(not(target_os = "linux"))]
mod stub {
    use std::io;

    use crate::filter::Filter;

    pub fn supported() -> bool {
        false
    }

    /// Without a syscall table there is nothing to resolve against; names
    /// are checked at assembly time on the target that loads them.
    pub fn syscall_exists(_name: &str) -> bool {
        true
    }

    pub fn load(_filter: &Filter) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "seccomp filtering is only available on Linux",
        ))
    }
}
