//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// voxtree::core::logging::init();
/// log::info!("Tree loaded");
/// ```
pub fn init() {
    // A second call (e.g. from several doc tests in one process) is harmless.
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
