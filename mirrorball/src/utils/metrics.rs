use std::fmt::Display;

/// Runs given function, reporting how long it took when the `metrics` feature
/// is enabled.
#[cfg(feature = "metrics")]
pub fn measure<T>(label: impl Display, f: impl FnOnce() -> T) -> T {
    use std::time::Instant;

    let tt = Instant::now();
    let result = f();
    let elapsed = tt.elapsed();

    log::trace!("{label}: {}", humantime::format_duration(elapsed));

    result
}

#[cfg(not(feature = "metrics"))]
pub fn measure<T>(_: impl Display, f: impl FnOnce() -> T) -> T {
    f()
}
