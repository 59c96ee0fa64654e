//! Request, outcome and batch result types

use thiserror::Error;

use crate::error::PrintResult;
use crate::validation::{validate_label_text, validate_quantity};

/// One print action: `quantity` identical labels for a (label type, SKU) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRequest {
    pub label_type: String,
    pub sku: String,
    pub quantity: u32,
}

impl LabelRequest {
    pub fn new(label_type: impl Into<String>, sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            label_type: label_type.into(),
            sku: sku.into(),
            quantity,
        }
    }

    /// Trimmed copy of this request, or the first precondition it violates
    pub fn validated(&self) -> PrintResult<LabelRequest> {
        let label_type = self.label_type.trim();
        let sku = self.sku.trim();

        validate_label_text(label_type, "Label type", "Please select a label type")?;
        validate_label_text(sku, "SKU", "Please enter a SKU")?;
        validate_quantity(self.quantity)?;

        Ok(LabelRequest {
            label_type: label_type.to_string(),
            sku: sku.to_string(),
            quantity: self.quantity,
        })
    }
}

/// Why a single label was not printed
///
/// `Display` is the operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// Status probe reported the service as not ready
    #[error("DYMO Connect is not running")]
    ServiceUnavailable,

    /// Service could not parse the label document
    #[error("XML formatting error - check DYMO Connect")]
    MalformedDocument,

    /// Service answered HTTP 500
    #[error("DYMO Connect internal error")]
    ServiceInternalError,

    /// Connection refused, reset or timed out
    #[error("Cannot connect to DYMO Connect")]
    TransportUnreachable,

    /// HTTP success with a body other than `true`
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("{0}")]
    Other(String),
}

/// Result of submitting one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failure(FailureReason),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success)
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            SubmissionOutcome::Success => None,
            SubmissionOutcome::Failure(reason) => Some(reason),
        }
    }
}

/// Aggregate result of one batch
///
/// `outcomes` stops growing at the first failure, so
/// `succeeded <= attempted <= requested` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Quantity asked for
    pub requested: u32,
    /// Labels actually sent to the service
    pub attempted: u32,
    /// Labels the service accepted
    pub succeeded: u32,
    pub outcomes: Vec<SubmissionOutcome>,
    /// Batch stopped early on operator request
    pub cancelled: bool,
}

impl BatchResult {
    pub(crate) fn new(requested: u32) -> Self {
        Self {
            requested,
            attempted: 0,
            succeeded: 0,
            outcomes: Vec::with_capacity(requested as usize),
            cancelled: false,
        }
    }

    /// Probe failed: nothing was sent
    pub(crate) fn service_unavailable(requested: u32) -> Self {
        let mut result = Self::new(requested);
        result
            .outcomes
            .push(SubmissionOutcome::Failure(FailureReason::ServiceUnavailable));
        result
    }

    pub(crate) fn record(&mut self, outcome: SubmissionOutcome) {
        self.attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Every requested label was printed
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.requested
    }

    /// The failure that stopped the batch, if any
    pub fn failure(&self) -> Option<&FailureReason> {
        self.outcomes.iter().find_map(SubmissionOutcome::failure)
    }
}
