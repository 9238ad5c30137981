//! The ingestion pipeline: one pull cycle from inbox to backend and back.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use pushferry_types::{
    ClassifiedReference, CycleReport, MessageFilter, MessageKind, NotificationSource, NotifyError,
    RawMessage, TorrentSink,
};

use crate::classify::classify;
use crate::resolve::Resolver;

/// Title of the confirmation message posted after an accepted submission.
const CONFIRMATION_TITLE: &str = "Torrent added";

/// Orchestrates one pull cycle: fetch candidate messages, classify, resolve,
/// submit, and report back through the notification channel.
///
/// The pipeline holds no watermark state of its own. The caller owns the
/// `since` bound, advances it from [`CycleReport::latest_modified`], and must
/// not run overlapping cycles against the same watermark.
#[allow(missing_debug_implementations)]
pub struct Pipeline<S, T> {
    source: S,
    sink: T,
    resolver: Resolver,
    device_id: String,
}

impl<S: NotificationSource, T: TorrentSink> Pipeline<S, T> {
    /// Create a pipeline over explicitly constructed clients. `device_id` is
    /// the notification-service identity this instance consumes messages for.
    pub fn new(source: S, sink: T, resolver: Resolver, device_id: impl Into<String>) -> Self {
        Self {
            source,
            sink,
            resolver,
            device_id: device_id.into(),
        }
    }

    /// Decompose the pipeline back into its clients and resolver.
    pub fn into_parts(self) -> (S, T, Resolver) {
        (self.source, self.sink, self.resolver)
    }

    /// Run one pull cycle over messages modified at or after `since`.
    ///
    /// Only the initial listing can fail the cycle as a whole. Every
    /// per-message failure is logged, counted in the report, and never stops
    /// the remaining messages from being processed.
    pub async fn run_cycle(&self, since: DateTime<Utc>) -> Result<CycleReport, NotifyError> {
        let filter = MessageFilter {
            modified_since: since,
            kinds: vec![MessageKind::Link, MessageKind::Note],
            active_only: true,
        };
        let messages = self.source.list_messages(&filter).await?;
        debug!("Fetched {} messages modified since {since}", messages.len());

        let mut report = CycleReport {
            // The watermark must advance past everything fetched, including
            // messages addressed to other devices.
            latest_modified: messages.iter().map(|m| m.modified_at).max(),
            ..CycleReport::default()
        };

        for msg in &messages {
            if !self.is_addressed_to_us(msg) {
                debug!("Message {} is not addressed to this device, dropping", msg.id);
                continue;
            }
            report.processed += 1;
            self.handle_message(msg, &mut report).await;
        }

        info!(
            "Cycle complete: {} processed, {} skipped, {} resolve failures, {} submit failures, {} submitted",
            report.processed,
            report.skipped,
            report.resolve_failed,
            report.submit_failed,
            report.submitted
        );
        Ok(report)
    }

    fn is_addressed_to_us(&self, msg: &RawMessage) -> bool {
        msg.target_device_id.as_deref() == Some(self.device_id.as_str())
    }

    async fn handle_message(&self, msg: &RawMessage, report: &mut CycleReport) {
        let reference = classify(msg);
        if reference == ClassifiedReference::Irrelevant {
            if msg.kind == MessageKind::File {
                warn!("Message {} is a file attachment, which is unsupported; skipping", msg.id);
            } else {
                debug!("Message {} carries no torrent reference, skipping", msg.id);
            }
            report.skipped += 1;
            return;
        }

        let descriptor = match self.resolver.resolve(&reference).await {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!("Failed to resolve message {}: {err}", msg.id);
                report.resolve_failed += 1;
                return;
            }
        };

        let added = match self.sink.add_torrent(&descriptor).await {
            Ok(added) => added,
            Err(err) => {
                warn!("Failed to submit torrent for message {}: {err}", msg.id);
                report.submit_failed += 1;
                return;
            }
        };
        report.submitted += 1;
        debug!("Backend accepted torrent \"{}\"", added.name);

        // The submission already succeeded; a failed confirmation post is
        // logged but does not roll it back.
        if let Err(err) = self
            .source
            .post_message(
                &self.device_id,
                CONFIRMATION_TITLE,
                &format!("Added \"{}\"", added.name),
            )
            .await
        {
            warn!("Failed to post confirmation for message {}: {err}", msg.id);
        }
    }
}
