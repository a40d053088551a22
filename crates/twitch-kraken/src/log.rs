/// Sink for the one-line summary written before each request
///
/// Called at most once per call, with a tag and the final `METHOD url`.
pub trait RequestLog: Send + Sync {
    fn info(&self, tag: &str, message: &str);
}

/// Forwards request lines to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl RequestLog for TracingLog {
    fn info(&self, tag: &str, message: &str) {
        tracing::info!(target: "twitch_kraken::request", "{} {}", tag, message);
    }
}
