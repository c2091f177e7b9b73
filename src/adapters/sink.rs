use crate::domain::model::PassSummary;
use crate::domain::ports::LogSink;

/// Sends notifications and errors to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn notify(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn complete(&self, summary: &PassSummary) {
        tracing::info!(
            "✅ Completed new entries check: {} candidates, {} announced, {} refreshed, {} unmatched, {} failed",
            summary.candidates,
            summary.announced,
            summary.refreshed,
            summary.unmatched,
            summary.failed
        );
    }
}
