//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=blockgrid=trace`
/// to see individual evictions.
///
/// # Example
/// ```
/// blockgrid::core::logging::init();
/// log::info!("Planner started");
/// ```
pub fn init() {
    // may run more than once (tests, doctests)
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
