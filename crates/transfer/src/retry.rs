use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// Fixed-delay retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failed attempts tolerated before giving up (at least 1).
    pub max_attempts: u32,
    /// Pause after each failed attempt.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// Writes all of `data`, retrying failed writes per `policy`.
///
/// Each retry resumes from the last byte the writer accepted, so a
/// partially applied write is never duplicated. Returns the last error
/// once `max_attempts` writes have failed.
pub async fn write_with_retry<W>(
    writer: &mut W,
    data: &[u8],
    policy: &RetryPolicy,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    let mut failures = 0;
    while written < data.len() {
        let err = match writer.write(&data[written..]).await {
            Ok(0) => std::io::Error::from(std::io::ErrorKind::WriteZero),
            Ok(n) => {
                written += n;
                continue;
            }
            Err(e) => e,
        };

        failures += 1;
        if failures >= policy.max_attempts.max(1) {
            return Err(err);
        }
        warn!(attempt = failures, written, error = %err, "write failed, retrying");
        tokio::time::sleep(policy.delay).await;
    }
    Ok(())
}
