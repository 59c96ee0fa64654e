//! Operator-facing status lines

use std::fmt;

use crate::batch::BatchEvent;
use crate::error::PrintError;
use crate::types::{BatchResult, FailureReason, LabelRequest, SubmissionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One line of status text plus how to present it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    /// Idle status
    pub fn ready() -> Self {
        Self::info("Ready")
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&PrintError> for StatusMessage {
    fn from(err: &PrintError) -> Self {
        Self::error(err.to_string())
    }
}

impl BatchEvent {
    /// Status line for this step, if it has one
    pub fn status(&self) -> Option<StatusMessage> {
        match self {
            BatchEvent::Probing => Some(StatusMessage::info("Connecting to DYMO Connect...")),
            BatchEvent::ServiceUnavailable => Some(StatusMessage::error(
                FailureReason::ServiceUnavailable.to_string(),
            )),
            BatchEvent::ItemStarted { total: 1, .. } => {
                Some(StatusMessage::info("Printing label..."))
            }
            BatchEvent::ItemStarted { index, total } => Some(StatusMessage::info(format!(
                "Printing label {} of {}...",
                index, total
            ))),
            BatchEvent::ItemFailed { index, reason, .. } => Some(StatusMessage::error(format!(
                "Print {} failed: {}",
                index, reason
            ))),
            BatchEvent::Cancelled { succeeded, total } => Some(StatusMessage::error(format!(
                "Printing cancelled after {} of {} labels",
                succeeded, total
            ))),
            BatchEvent::ItemSucceeded { .. }
            | BatchEvent::Pacing { .. }
            | BatchEvent::Finished { .. } => None,
        }
    }
}

/// Final status line for a finished batch
pub fn batch_summary(request: &LabelRequest, result: &BatchResult) -> StatusMessage {
    let label_type = request.label_type.trim();
    let sku = request.sku.trim();

    if result.attempted == 0
        && let [SubmissionOutcome::Failure(reason)] = result.outcomes.as_slice()
    {
        return StatusMessage::error(reason.to_string());
    }

    if result.is_complete() {
        return if result.requested == 1 {
            StatusMessage::success(format!(
                "Label printed successfully! ({} - {})",
                label_type, sku
            ))
        } else {
            StatusMessage::success(format!(
                "{} labels printed successfully! ({} - {})",
                result.succeeded, label_type, sku
            ))
        };
    }

    if result.cancelled {
        return StatusMessage::error(format!(
            "Printing cancelled after {} of {} labels",
            result.succeeded, result.requested
        ));
    }

    StatusMessage::error(format!(
        "Only {} of {} labels printed successfully",
        result.succeeded, result.requested
    ))
}

/// Caption for the print action ("Print Label", "Print 3 Labels")
pub fn print_action_caption(quantity: u32) -> String {
    if quantity <= 1 {
        "Print Label".to_string()
    } else {
        format!("Print {} Labels", quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(requested: u32, outcomes: Vec<SubmissionOutcome>) -> BatchResult {
        let mut result = BatchResult::new(requested);
        for outcome in outcomes {
            result.record(outcome);
        }
        result
    }

    #[test]
    fn test_event_status() {
        assert_eq!(
            BatchEvent::ItemStarted { index: 1, total: 1 }.status(),
            Some(StatusMessage::info("Printing label..."))
        );
        assert_eq!(
            BatchEvent::ItemStarted { index: 2, total: 3 }.status(),
            Some(StatusMessage::info("Printing label 2 of 3..."))
        );
        assert_eq!(
            BatchEvent::ItemFailed {
                index: 2,
                total: 3,
                reason: FailureReason::ServiceInternalError,
            }
            .status(),
            Some(StatusMessage::error(
                "Print 2 failed: DYMO Connect internal error"
            ))
        );
        assert_eq!(BatchEvent::ItemSucceeded { index: 1, total: 3 }.status(), None);
    }

    #[test]
    fn test_summary_single() {
        let request = LabelRequest::new("CPU", "ABC123", 1);
        let summary = batch_summary(&request, &result(1, vec![SubmissionOutcome::Success]));
        assert_eq!(
            summary,
            StatusMessage::success("Label printed successfully! (CPU - ABC123)")
        );
    }

    #[test]
    fn test_summary_multiple() {
        let request = LabelRequest::new("CPU", "ABC123", 3);
        let summary = batch_summary(
            &request,
            &result(3, vec![SubmissionOutcome::Success; 3]),
        );
        assert_eq!(
            summary,
            StatusMessage::success("3 labels printed successfully! (CPU - ABC123)")
        );
    }

    #[test]
    fn test_summary_partial() {
        let request = LabelRequest::new("CPU", "ABC123", 4);
        let summary = batch_summary(
            &request,
            &result(
                4,
                vec![
                    SubmissionOutcome::Success,
                    SubmissionOutcome::Failure(FailureReason::MalformedDocument),
                ],
            ),
        );
        assert_eq!(
            summary,
            StatusMessage::error("Only 1 of 4 labels printed successfully")
        );
    }

    #[test]
    fn test_summary_unavailable() {
        let request = LabelRequest::new("CPU", "ABC123", 2);
        let summary = batch_summary(&request, &BatchResult::service_unavailable(2));
        assert_eq!(summary, StatusMessage::error("DYMO Connect is not running"));
    }

    #[test]
    fn test_summary_first_item_failed() {
        let request = LabelRequest::new("CPU", "ABC123", 2);
        let summary = batch_summary(
            &request,
            &result(
                2,
                vec![SubmissionOutcome::Failure(FailureReason::TransportUnreachable)],
            ),
        );
        assert_eq!(
            summary,
            StatusMessage::error("Only 0 of 2 labels printed successfully")
        );
    }

    #[test]
    fn test_print_action_caption() {
        assert_eq!(print_action_caption(1), "Print Label");
        assert_eq!(print_action_caption(5), "Print 5 Labels");
    }
}
