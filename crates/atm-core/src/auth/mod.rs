//! Authentication: PIN validation, attempt counting and lockout

mod guard;
mod lockout;

pub use guard::SessionGuard;
pub use lockout::{FileLockoutStore, LockoutPolicy, LockoutStore, MemoryLockoutStore};
