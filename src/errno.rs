use std::ffi::CStr;

use libc::{__errno_location, c_int, strerror};

pub(crate) fn last_errno() -> c_int {
    unsafe { *__errno_location() }
}

/// Human readable message for an errno value, as `perror` would print it.
pub(crate) fn describe(errno: c_int) -> String {
    unsafe { CStr::from_ptr(strerror(errno)) }
        .to_string_lossy()
        .into_owned()
}
