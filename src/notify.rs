// NotificationHub: classification fan-out to attached clients
//
// Publishing never blocks the pipeline thread. A publish with no client
// attached is a normal, counted no-op; lagging clients lose the oldest
// messages rather than holding the sender back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::analysis::classifier::ClassificationState;
use crate::analysis::CycleReport;

/// Buffered classification states per client
///
/// One state per cycle; 16 cycles is well over a minute at the device cadence.
const CLASSIFICATION_CHANNEL_CAPACITY: usize = 16;

/// Buffered cycle reports per telemetry client
const REPORT_CHANNEL_CAPACITY: usize = 64;

/// Outcome of a single publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Number of clients the state was queued for
    Delivered(usize),
    /// No client attached; the state was dropped
    NoClient,
}

/// Sink for completed cycles
///
/// Implementations must return promptly; the pipeline thread calls this once
/// per cycle.
pub trait Notifier: Send {
    fn publish(&self, report: &CycleReport) -> Delivery;
}

/// Broadcast-backed [`Notifier`]
///
/// Clones share the same channels, so a clone handed to the pipeline thread
/// publishes to subscribers attached through any other clone.
#[derive(Clone)]
pub struct NotificationHub {
    classification: broadcast::Sender<ClassificationState>,
    reports: broadcast::Sender<CycleReport>,
    undelivered: Arc<AtomicU64>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (classification, _) = broadcast::channel(CLASSIFICATION_CHANNEL_CAPACITY);
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        Self {
            classification,
            reports,
            undelivered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attach a client for classification states
    ///
    /// # Returns
    /// `broadcast::Receiver<ClassificationState>` - Receives every state published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ClassificationState> {
        self.classification.subscribe()
    }

    /// Attach a telemetry client receiving full cycle reports
    pub fn subscribe_reports(&self) -> broadcast::Receiver<CycleReport> {
        self.reports.subscribe()
    }

    /// Classification states as an async stream
    ///
    /// Lagged messages are skipped silently.
    pub fn classification_stream(&self) -> impl Stream<Item = ClassificationState> + Send + 'static {
        BroadcastStream::new(self.classification.subscribe())
            .filter_map(|result| async move { result.ok() })
    }

    pub fn client_count(&self) -> usize {
        self.classification.receiver_count()
    }

    /// States published while no client was attached
    pub fn undelivered_count(&self) -> u64 {
        self.undelivered.load(Ordering::Relaxed)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NotificationHub {
    fn publish(&self, report: &CycleReport) -> Delivery {
        // Telemetry has no delivery accounting
        let _ = self.reports.send(report.clone());

        match self.classification.send(report.state) {
            Ok(receivers) => Delivery::Delivered(receivers),
            Err(_) => {
                self.undelivered.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "[NotificationHub] No client attached, dropping {}",
                    report.state.symptom.label()
                );
                Delivery::NoClient
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::Symptom;
    use tokio::sync::broadcast::error::TryRecvError;

    fn report(symptom: Symptom, intensity: u8) -> CycleReport {
        CycleReport {
            cycle: 0,
            state: ClassificationState { symptom, intensity },
            vote: Default::default(),
            score: Default::default(),
            sums: Default::default(),
        }
    }

    #[test]
    fn test_publish_without_client_is_counted_noop() {
        let hub = NotificationHub::new();
        assert_eq!(hub.client_count(), 0);

        assert_eq!(hub.publish(&report(Symptom::Stable, 0)), Delivery::NoClient);
        assert_eq!(hub.publish(&report(Symptom::Tremor, 4)), Delivery::NoClient);
        assert_eq!(hub.undelivered_count(), 2);
    }

    #[test]
    fn test_multiple_subscribers() {
        let hub = NotificationHub::new();
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();

        assert_eq!(
            hub.publish(&report(Symptom::Tremor, 7)),
            Delivery::Delivered(2)
        );

        // Both subscribers receive the message
        let expected = ClassificationState {
            symptom: Symptom::Tremor,
            intensity: 7,
        };
        assert_eq!(rx1.try_recv().unwrap(), expected);
        assert_eq!(rx2.try_recv().unwrap(), expected);
        assert_eq!(hub.undelivered_count(), 0);
    }

    #[test]
    fn test_clone_shares_channels() {
        let hub = NotificationHub::new();
        let publisher = hub.clone();
        let mut rx = hub.subscribe();

        publisher.publish(&report(Symptom::Dyskinesia, 3));
        assert_eq!(rx.try_recv().unwrap().symptom, Symptom::Dyskinesia);
    }

    #[test]
    fn test_report_channel_carries_telemetry() {
        let hub = NotificationHub::new();
        let mut reports = hub.subscribe_reports();

        // Reports flow even with no classification client
        assert_eq!(hub.publish(&report(Symptom::Stable, 0)), Delivery::NoClient);
        assert_eq!(reports.try_recv().unwrap().state.symptom, Symptom::Stable);
    }

    #[test]
    fn test_slow_client_lags_without_blocking_publisher() {
        let hub = NotificationHub::new();
        let mut rx = hub.subscribe();

        for i in 0..(CLASSIFICATION_CHANNEL_CAPACITY + 4) {
            hub.publish(&report(Symptom::Tremor, i as u8));
        }

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(4))));
        assert_eq!(rx.try_recv().unwrap().intensity, 4);
    }

    #[tokio::test]
    async fn test_classification_stream_yields_states() {
        let hub = NotificationHub::new();
        let mut stream = Box::pin(hub.classification_stream());

        hub.publish(&report(Symptom::Tremor, 9));
        hub.publish(&report(Symptom::Stable, 0));

        assert_eq!(stream.next().await.unwrap().intensity, 9);
        assert_eq!(stream.next().await.unwrap().symptom, Symptom::Stable);
    }
}
