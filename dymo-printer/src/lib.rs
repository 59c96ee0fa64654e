//! # dymo-printer
//!
//! Label submission pipeline for the local DYMO Connect web service.
//!
//! ## Scope
//!
//! This crate handles everything between "print N labels of this type and
//! SKU" and the service's answer:
//! - Label document building (fixed DieCutLabel template)
//! - Transport to DYMO Connect over loopback HTTPS
//! - Batch control: strictly sequential, stop on first failure, paced
//! - Response classification and operator status text
//! - Label type preferences (JSON file)
//!
//! Input collection and rendering stay in the shell (`dymo-desk`).
//!
//! ## Example
//!
//! ```ignore
//! use dymo_printer::{BatchPrinter, LabelRequest, PrintServiceConfig, batch_summary};
//!
//! let config = PrintServiceConfig::default();
//! let printer = BatchPrinter::new(config.build_client()?).with_pacing(config.pacing);
//!
//! let request = LabelRequest::new("CPU", "ABC123", 3);
//! let result = printer.print_batch(&request).await?;
//! println!("{}", batch_summary(&request, &result));
//! ```

mod batch;
mod client;
mod config;
mod error;
mod label;
mod preferences;
mod status;
mod types;
mod validation;

// Re-exports
pub use batch::{BatchEvent, BatchPrinter};
pub use client::{
    DymoClient, LabelService, classify_http_error, classify_print_response, encode_print_form,
};
pub use config::{
    DEFAULT_PACING, DEFAULT_PROBE_TIMEOUT, DEFAULT_SERVICE_URL, DEFAULT_SUBMIT_TIMEOUT,
    PrintServiceConfig,
};
pub use error::{PrintError, PrintResult};
pub use label::LabelDocument;
pub use preferences::{DEFAULT_LABEL_TYPES, Preferences, PreferencesStore};
pub use status::{StatusKind, StatusMessage, batch_summary, print_action_caption};
pub use types::{BatchResult, FailureReason, LabelRequest, SubmissionOutcome};
pub use validation::{MAX_QUANTITY, MIN_QUANTITY, parse_quantity};

// Cancellation handle for BatchPrinter::with_cancellation
pub use tokio_util::sync::CancellationToken;
