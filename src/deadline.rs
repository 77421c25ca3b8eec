//! Bounded waits for outbound calls.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Race `call` against a deadline timer.
///
/// Whichever side loses is dropped: if the deadline elapses first the call
/// future is dropped mid-flight (aborting any request it owns) and
/// [`Error::Timeout`] is returned; if the call settles first the timer is
/// dropped together with the `Timeout` future and never fires.
pub async fn call_with_deadline<T, F>(deadline: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(deadline)),
    }
}
