//! Optional gates
//!
//! A nice-to-have resource (logo image, decorative asset) reports success
//! and failure through two branches. The barrier only needs to know that
//! the resource settled, so both collapse into one signal that never fails.

use futures::FutureExt;
use std::fmt;
use std::future::Future;

/// Resolve to `()` once `source` settles, logging a failure instead of
/// propagating it.
pub fn always_ready<F, T, E>(gate: String, source: F) -> impl Future<Output = ()> + Send + 'static
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    source.map(move |result| {
        if let Err(err) = result {
            tracing::warn!(gate = %gate, error = %err, "optional gate failed, treating as ready");
        }
    })
}
