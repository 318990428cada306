//! Retry loop for generation requests.

use std::thread;

use tracing::warn;

use crate::error::Result;

use super::provider::GenerationConfig;

/// Run `attempt` until it succeeds, fails permanently, or retries run out.
///
/// Only errors for which [`NextDateError::is_transient`](crate::NextDateError::is_transient)
/// holds are retried, with `config.retry_backoff` between attempts.
pub fn with_retries<T>(
    config: &GenerationConfig,
    provider: &str,
    mut attempt: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut retries = 0;
    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retries < config.max_retries => {
                retries += 1;
                warn!(
                    provider,
                    retry = retries,
                    max_retries = config.max_retries,
                    error = %e,
                    "transient generation failure; retrying"
                );
                thread::sleep(config.retry_backoff);
            }
            Err(e) => return Err(e),
        }
    }
}
