pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log every 100th navigation tick when the `perf_stats` feature is enabled.
///
/// `$tick` is anything with a `u64` in field `.0`, normally `Res<NavTick>`.
/// Without `perf_stats` the macro expands to nothing and its arguments are
/// never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(tick, "[NAV] Agents navigating: {}", query.iter().len());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
