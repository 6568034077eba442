// https://github.com/vorner/signal-hook/blob/master/signal-hook-registry/src/lib.rs

use std::mem::MaybeUninit;
use std::ptr::null_mut;

use libc::{c_int, c_void, sigemptyset, sighandler_t, siginfo_t};
use thiserror::Error;

use crate::errno::{describe, last_errno};

#[derive(Debug, PartialEq, Error)]
pub enum SigError {
    #[error("{}", describe(*.0))]
    Syscall(c_int),
}

/// Catches SIGINT without doing anything, so an interrupt typed at the
/// terminal only terminates the foreground child. Caught signals are reset to
/// their default disposition by `execvp`, children are unaffected.
pub(crate) extern "C" fn ignore_interrupt(_sig: c_int, _info: *mut siginfo_t, _gdata: *mut c_void) {
}

pub(crate) fn install_sighandler(
    signum: c_int,
    handler: extern "C" fn(c_int, *mut siginfo_t, *mut c_void),
) -> Result<(), SigError> {
    let mut sa = unsafe { MaybeUninit::<libc::sigaction>::zeroed().assume_init() };
    sa.sa_flags = libc::SA_SIGINFO | libc::SA_RESTART;
    sa.sa_sigaction = handler as sighandler_t;

    if unsafe { sigemptyset(&mut sa.sa_mask) } == -1 {
        return Err(SigError::Syscall(last_errno()));
    }

    match unsafe { libc::sigaction(signum, &sa, null_mut()) } {
        -1 => Err(SigError::Syscall(last_errno())),
        _ => Ok(()),
    }
}
