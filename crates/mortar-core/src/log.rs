//! Zero-cost tracing macros.
//!
//! With the `tracing` feature enabled these forward to the `tracing` crate.
//! Without it (the default) they expand to nothing, so hot paths pay no cost
//! and downstream crates do not need their own `tracing` dependency.
//!
//! ```bash
//! RUST_LOG=mortar_core=debug cargo test --features mortar-core/tracing
//! ```

/// Trace-level event. Compiles to nothing without the `tracing` feature.
#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        $crate::__private::tracing::trace!($($arg)*)
    };
}

/// Trace-level event. Compiles to nothing without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level event. Compiles to nothing without the `tracing` feature.
#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::__private::tracing::debug!($($arg)*)
    };
}

/// Debug-level event. Compiles to nothing without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

/// Warn-level event. Compiles to nothing without the `tracing` feature.
#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::__private::tracing::warn!($($arg)*)
    };
}

/// Warn-level event. Compiles to nothing without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {};
}
