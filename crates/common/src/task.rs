use std::future::Future;

use tokio::task::JoinHandle;
use tracing::Instrument;

/// Spawns `future` on the current runtime inside a span labelled with the call site.
pub fn spawn<F>(file: &str, line: u32, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let span = tracing::debug_span!("task", label = %format!("{file}:{line}"));
    tokio::spawn(future.instrument(span))
}

#[macro_export]
macro_rules! spawn_tracked {
    ($fut:expr) => {
        $crate::task::spawn(file!(), line!(), $fut)
    };
}
