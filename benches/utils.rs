use std::time::Duration;

use criterion::Criterion;

/// Shorter runs than criterion's defaults. Command line flags still override them.
pub fn criterion() -> Criterion {
    let c = Criterion::default()
        .sample_size(50)
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(3))
        .configure_from_args();
    #[cfg(unix)]
    let c = {
        use pprof::criterion::{Output, PProfProfiler};
        c.with_profiler(PProfProfiler::new(500, Output::Flamegraph(None)))
    };
    c
}
