//! DYMO Connect transport
//!
//! Two calls against the local web service:
//! - `GET  {base}/StatusConnected` - readiness probe
//! - `POST {base}/PrintLabel`      - submit one label document

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};

use crate::config::PrintServiceConfig;
use crate::error::PrintResult;
use crate::label::LabelDocument;
use crate::types::{FailureReason, SubmissionOutcome};

const STATUS_PATH: &str = "StatusConnected";
const PRINT_PATH: &str = "PrintLabel";

/// Marker the service puts in the error body when it cannot parse `labelXml`
const INVALID_STREAM_MARKER: &str = "Invalid parameter in stream";

/// Trait for label print services
#[allow(async_fn_in_trait)]
pub trait LabelService {
    /// Check whether the service is ready to accept work. Fails closed.
    async fn probe_availability(&self) -> bool;

    /// Submit one label document and classify the response
    async fn submit(&self, document: &LabelDocument) -> SubmissionOutcome;
}

/// HTTP(S) client for the local DYMO Connect service
#[derive(Debug, Clone)]
pub struct DymoClient {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
    submit_timeout: Duration,
}

impl DymoClient {
    /// Create a client from configuration
    ///
    /// With `trust_local_service` the service certificate is accepted without
    /// verification; the config only allows that for loopback hosts.
    pub fn new(config: &PrintServiceConfig) -> PrintResult<Self> {
        config.validate()?;

        if config.trust_local_service {
            debug!(base_url = %config.base_url, "Certificate verification disabled for local service");
        }

        let client = Client::builder()
            .no_proxy()
            .danger_accept_invalid_certs(config.trust_local_service)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            probe_timeout: config.probe_timeout,
            submit_timeout: config.submit_timeout,
        })
    }

    /// Get the service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl LabelService for DymoClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn probe_availability(&self) -> bool {
        let response = match self
            .client
            .get(self.endpoint(STATUS_PATH))
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "DYMO Connect status check failed");
                return false;
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => {
                let connected = status.is_success() && body.trim() == "true";
                info!(status = status.as_u16(), body = %body.trim(), connected, "DYMO Connect status");
                connected
            }
            Err(e) => {
                warn!(error = %e, "DYMO Connect status body unreadable");
                false
            }
        }
    }

    #[instrument(skip(self, document), fields(base_url = %self.base_url, xml_len = document.len()))]
    async fn submit(&self, document: &LabelDocument) -> SubmissionOutcome {
        let form = encode_print_form(document);
        debug!(form_len = form.len(), "Sending print request");

        let response = match self
            .client
            .post(self.endpoint(PRINT_PATH))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .timeout(self.submit_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Print request did not reach DYMO Connect");
                return SubmissionOutcome::Failure(FailureReason::TransportUnreachable);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = classify_http_error(status, &body);
            warn!(status = status.as_u16(), body = %body, %reason, "Print request rejected");
            return SubmissionOutcome::Failure(reason);
        }

        match response.text().await {
            Ok(body) => {
                let outcome = classify_print_response(&body);
                info!(body = %body.trim(), success = outcome.is_success(), "Print response");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "Print response body unreadable");
                SubmissionOutcome::Failure(FailureReason::Other(e.to_string()))
            }
        }
    }
}

/// Build the `PrintLabel` form body
///
/// Only `labelXml` carries data; printer name, print parameters and label set
/// are sent empty so the service uses its defaults.
pub fn encode_print_form(document: &LabelDocument) -> String {
    let fields = [
        ("printerName", ""),
        ("printParamsXml", ""),
        ("labelXml", document.as_str()),
        ("labelSetXml", ""),
    ];

    fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Classify a non-success HTTP response.
///
/// The body marker wins over the status code.
pub fn classify_http_error(status: StatusCode, body: &str) -> FailureReason {
    if body.contains(INVALID_STREAM_MARKER) {
        FailureReason::MalformedDocument
    } else if status == StatusCode::INTERNAL_SERVER_ERROR {
        FailureReason::ServiceInternalError
    } else {
        FailureReason::Other(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        ))
    }
}

/// Classify the body of a successful `PrintLabel` response
pub fn classify_print_response(body: &str) -> SubmissionOutcome {
    let body = body.trim();
    if body == "true" {
        SubmissionOutcome::Success
    } else {
        SubmissionOutcome::Failure(FailureReason::UnexpectedResponse(body.to_string()))
    }
}
