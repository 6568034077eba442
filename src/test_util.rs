use std::sync::{Mutex, MutexGuard};

use lazy_static::lazy_static;

lazy_static! {
    static ref CWD_LOCK: Mutex<()> = Mutex::new(());
}

/// Held by every test that reads or changes the process working directory.
pub(crate) fn lock_cwd() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
