//! Batch print controller
//!
//! Prints `quantity` identical labels strictly in order, stopping at the
//! first failure. Consecutive labels are separated by a pacing delay that
//! can be interrupted through a [`CancellationToken`].

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::client::LabelService;
use crate::config::DEFAULT_PACING;
use crate::error::PrintResult;
use crate::label::LabelDocument;
use crate::types::{BatchResult, FailureReason, LabelRequest, SubmissionOutcome};

/// Progress of a running batch, one event per step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Checking the service before the first label
    Probing,
    ServiceUnavailable,
    ItemStarted { index: u32, total: u32 },
    ItemSucceeded { index: u32, total: u32 },
    ItemFailed { index: u32, total: u32, reason: FailureReason },
    /// Waiting before label `next`
    Pacing { next: u32, delay: Duration },
    Cancelled { succeeded: u32, total: u32 },
    Finished { succeeded: u32, total: u32 },
}

/// Drives one [`LabelService`] through batches of identical labels
///
/// Holds no state between [`BatchPrinter::print_batch`] calls.
pub struct BatchPrinter<S> {
    service: S,
    pacing: Duration,
    events: Option<UnboundedSender<BatchEvent>>,
    cancel: CancellationToken,
}

impl<S: LabelService> BatchPrinter<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            pacing: DEFAULT_PACING,
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the delay between consecutive labels
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Report progress events to `tx`
    pub fn with_events(mut self, tx: UnboundedSender<BatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Stop the batch before its next label once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Print `request.quantity` labels.
    ///
    /// Returns `Err` only for precondition failures, which are detected before
    /// the service is contacted. Service failures end up in the result.
    #[instrument(
        skip(self, request),
        fields(label_type = %request.label_type, sku = %request.sku, quantity = request.quantity)
    )]
    pub async fn print_batch(&self, request: &LabelRequest) -> PrintResult<BatchResult> {
        let request = request.validated()?;
        let total = request.quantity;

        self.emit(BatchEvent::Probing);
        if !self.service.probe_availability().await {
            warn!("Print service unavailable, batch aborted");
            self.emit(BatchEvent::ServiceUnavailable);
            return Ok(BatchResult::service_unavailable(total));
        }

        let mut result = BatchResult::new(total);

        for index in 1..=total {
            if index > 1 && !self.pace(index).await {
                break;
            }
            if self.cancel.is_cancelled() {
                break;
            }

            self.emit(BatchEvent::ItemStarted { index, total });

            // Rebuilt for every label, never cached
            let document = LabelDocument::build(&request.label_type, &request.sku);
            let outcome = self.service.submit(&document).await;
            result.record(outcome.clone());

            match outcome {
                SubmissionOutcome::Success => {
                    debug!(index, total, "Label printed");
                    self.emit(BatchEvent::ItemSucceeded { index, total });
                }
                SubmissionOutcome::Failure(reason) => {
                    warn!(index, total, %reason, "Label failed, stopping batch");
                    self.emit(BatchEvent::ItemFailed {
                        index,
                        total,
                        reason,
                    });
                    break;
                }
            }
        }

        if self.cancel.is_cancelled() && result.failure().is_none() && !result.is_complete() {
            result.cancelled = true;
            info!(succeeded = result.succeeded, total, "Batch cancelled");
            self.emit(BatchEvent::Cancelled {
                succeeded: result.succeeded,
                total,
            });
        }

        info!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            total,
            "Batch finished"
        );
        self.emit(BatchEvent::Finished {
            succeeded: result.succeeded,
            total,
        });

        Ok(result)
    }

    /// Wait before label `next`. Returns false if cancelled meanwhile.
    async fn pace(&self, next: u32) -> bool {
        self.emit(BatchEvent::Pacing {
            next,
            delay: self.pacing,
        });

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.pacing) => true,
        }
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            // Receiver gone just means nobody is watching
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrintError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    /// Service that replays scripted outcomes and records call times
    struct ScriptedService {
        available: bool,
        script: Mutex<VecDeque<SubmissionOutcome>>,
        probes: AtomicUsize,
        submissions: Mutex<Vec<(Instant, String)>>,
    }

    impl ScriptedService {
        fn new(available: bool, script: Vec<SubmissionOutcome>) -> Self {
            Self {
                available,
                script: Mutex::new(script.into()),
                probes: AtomicUsize::new(0),
                submissions: Mutex::new(Vec::new()),
            }
        }

        fn all_success() -> Self {
            Self::new(true, Vec::new())
        }

        fn submit_count(&self) -> usize {
            self.submissions.lock().unwrap().len()
        }

        fn submit_times(&self) -> Vec<Instant> {
            self.submissions
                .lock()
                .unwrap()
                .iter()
                .map(|(at, _)| *at)
                .collect()
        }
    }

    impl LabelService for ScriptedService {
        async fn probe_availability(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.available
        }

        async fn submit(&self, document: &LabelDocument) -> SubmissionOutcome {
            self.submissions
                .lock()
                .unwrap()
                .push((Instant::now(), document.to_string()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(SubmissionOutcome::Success)
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<BatchEvent>) -> Vec<BatchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_request_makes_no_calls() {
        let printer = BatchPrinter::new(ScriptedService::all_success());

        for request in [
            LabelRequest::new("", "ABC123", 1),
            LabelRequest::new("CPU", "  ", 1),
            LabelRequest::new("CPU", "ABC123", 0),
            LabelRequest::new("CPU", "ABC123", 100),
        ] {
            let err = printer.print_batch(&request).await.unwrap_err();
            assert!(matches!(err, PrintError::InvalidRequest(_)));
        }

        assert_eq!(printer.service().probes.load(Ordering::SeqCst), 0);
        assert_eq!(printer.service().submit_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_short_circuits() {
        let printer = BatchPrinter::new(ScriptedService::new(false, Vec::new()));

        let result = printer
            .print_batch(&LabelRequest::new("CPU", "ABC123", 42))
            .await
            .unwrap();

        assert_eq!(result.attempted, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(
            result.outcomes,
            vec![SubmissionOutcome::Failure(FailureReason::ServiceUnavailable)]
        );
        assert_eq!(printer.service().submit_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_first_failure() {
        let failure = SubmissionOutcome::Failure(FailureReason::ServiceInternalError);
        let service = ScriptedService::new(
            true,
            vec![
                SubmissionOutcome::Success,
                SubmissionOutcome::Success,
                failure.clone(),
            ],
        );
        let printer = BatchPrinter::new(service);

        let result = printer
            .print_batch(&LabelRequest::new("CPU", "ABC123", 5))
            .await
            .unwrap();

        assert_eq!(result.requested, 5);
        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(
            result.outcomes,
            vec![SubmissionOutcome::Success, SubmissionOutcome::Success, failure]
        );
        assert!(!result.cancelled);
        assert_eq!(printer.service().submit_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_item_failure() {
        let service = ScriptedService::new(
            true,
            vec![SubmissionOutcome::Failure(FailureReason::TransportUnreachable)],
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = BatchPrinter::new(service).with_events(tx);

        let result = printer
            .print_batch(&LabelRequest::new("CPU", "ABC123", 3))
            .await
            .unwrap();

        assert_eq!(result.attempted, 1);
        assert_eq!(result.succeeded, 0);
        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(e, BatchEvent::Pacing { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_success_paces_between_items() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = BatchPrinter::new(ScriptedService::all_success()).with_events(tx);
        let start = Instant::now();

        let result = printer
            .print_batch(&LabelRequest::new("CPU", "ABC123", 3))
            .await
            .unwrap();

        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 3);
        assert!(result.is_complete());
        assert!(result.outcomes.iter().all(SubmissionOutcome::is_success));

        let times = printer.service().submit_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[0] - start, Duration::ZERO);
        assert_eq!(times[1] - times[0], Duration::from_millis(500));
        assert_eq!(times[2] - times[1], Duration::from_millis(500));
        assert_eq!(start.elapsed(), Duration::from_millis(1000));

        let events = drain(&mut rx);
        let pacing: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Pacing { next, .. } => Some(*next),
                _ => None,
            })
            .collect();
        assert_eq!(pacing, vec![2, 3]);
        assert_eq!(events.first(), Some(&BatchEvent::Probing));
        assert_eq!(
            events.last(),
            Some(&BatchEvent::Finished {
                succeeded: 3,
                total: 3
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_label_has_no_pacing() {
        let printer = BatchPrinter::new(ScriptedService::all_success());
        let start = Instant::now();

        let result = printer
            .print_batch(&LabelRequest::new("MOBO", "Z9", 1))
            .await
            .unwrap();

        assert_eq!(result.succeeded, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_label_rebuilt_with_trimmed_input() {
        let printer = BatchPrinter::new(ScriptedService::all_success());

        printer
            .print_batch(&LabelRequest::new(" CPU ", " ABC123 ", 2))
            .await
            .unwrap();

        let submissions = printer.service().submissions.lock().unwrap();
        let expected = LabelDocument::build("CPU", "ABC123").into_string();
        assert_eq!(submissions.len(), 2);
        assert!(submissions.iter().all(|(_, xml)| *xml == expected));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_pacing() {
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = BatchPrinter::new(ScriptedService::all_success())
            .with_events(tx)
            .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        let result = printer
            .print_batch(&LabelRequest::new("CPU", "ABC123", 10))
            .await
            .unwrap();
        canceller.await.unwrap();

        assert!(result.cancelled);
        assert_eq!(result.attempted, 1);
        assert_eq!(result.succeeded, 1);
        assert_eq!(printer.service().submit_count(), 1);
        assert!(drain(&mut rx).contains(&BatchEvent::Cancelled {
            succeeded: 1,
            total: 10
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let printer =
            BatchPrinter::new(ScriptedService::all_success()).with_cancellation(token);

        let result = printer
            .print_batch(&LabelRequest::new("CPU", "ABC123", 3))
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.attempted, 0);
        assert!(result.outcomes.is_empty());
        assert_eq!(printer.service().submit_count(), 0);
    }
}
