use std::time::Instant;

/// Runs a store call on the UI thread and logs how long it took.
pub fn run_blocking<F, T>(label: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let started = Instant::now();
    let value = f();
    log::debug!("{label} took {} ms", started.elapsed().as_millis());
    value
}
