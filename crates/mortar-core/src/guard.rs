//! Debug-build liveness tracking for disposable containers.
//!
//! [`DisposeGuard`] records whether its container has been disposed and traps
//! any later use. It also reports containers dropped without an explicit
//! `dispose()`. Release builds compile it to a zero-sized no-op.

#[cfg(debug_assertions)]
use crate::error::{trap, Violation};

/// Liveness guard embedded in each container.
///
/// In debug builds, [`check_live`](DisposeGuard::check_live) panics with
/// [`Violation::UseAfterDispose`](crate::error::Violation::UseAfterDispose) once [`dispose`](DisposeGuard::dispose) has
/// run, and dropping a guard that was never disposed emits a leak warning.
///
/// In release builds, this is an empty struct and every method is a no-op.
#[derive(Debug)]
pub struct DisposeGuard {
    #[cfg(debug_assertions)]
    container: &'static str,
    #[cfg(debug_assertions)]
    disposed: bool,
}

impl DisposeGuard {
    /// Create a live guard. `container` names the owner in diagnostics.
    pub fn new(
        #[cfg_attr(not(debug_assertions), allow(unused_variables))] container: &'static str,
    ) -> Self {
        Self {
            #[cfg(debug_assertions)]
            container,
            #[cfg(debug_assertions)]
            disposed: false,
        }
    }

    /// Trap if the container has already been disposed.
    #[inline]
    #[track_caller]
    pub fn check_live(&self) {
        #[cfg(debug_assertions)]
        {
            if self.disposed {
                trap(Violation::UseAfterDispose {
                    container: self.container,
                });
            }
        }
    }

    /// Mark the container disposed. Disposing twice traps.
    #[track_caller]
    pub fn dispose(&mut self) {
        self.check_live();
        #[cfg(debug_assertions)]
        {
            self.disposed = true;
        }
    }
}

#[cfg(debug_assertions)]
impl Drop for DisposeGuard {
    fn drop(&mut self) {
        if !self.disposed && !std::thread::panicking() {
            warn_log!(
                container = self.container,
                "container dropped without dispose(); memory freed on drop"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_guard_passes() {
        let guard = DisposeGuard::new("test");
        guard.check_live();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "test: used after dispose")]
    fn use_after_dispose_traps() {
        let mut guard = DisposeGuard::new("test");
        guard.dispose();
        guard.check_live();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "used after dispose")]
    fn double_dispose_traps() {
        let mut guard = DisposeGuard::new("test");
        guard.dispose();
        guard.dispose();
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn release_guard_is_zero_sized() {
        assert_eq!(std::mem::size_of::<DisposeGuard>(), 0);
        let mut guard = DisposeGuard::new("test");
        guard.dispose();
        guard.check_live();
    }
}
