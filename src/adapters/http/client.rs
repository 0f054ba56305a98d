//! HTTP Backend Client - reqwest implementation of the backend ports.
//!
//! One client serves every REST collaborator of the assistant: the risk
//! catalog, ATECO lookups, analytics, feedback and report delivery.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpBackendConfig::new("https://ateco-lookup.onrender.com")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let client = HttpBackendClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::domain::ateco::{AtecoItem, AtecoLookup};
use crate::domain::feedback::{FeedbackReceipt, FeedbackSubmission};
use crate::domain::risk::{AssessmentField, AssessmentOutcome, EventDetails, RiskEvent};
use crate::ports::{
    AssessmentSubmission, AtecoDirectory, BackendError, EventTracker, FeedbackSink, PreReport,
    ReportSender, RiskBackend, TrackedEvent,
};

use super::dto::{
    AckResponse, BatchRequest, BatchResponse, EventsResponse, FieldDto, FieldsResponse,
    LookupResponse, SaveResponse,
};

const ALREADY_SUBMITTED: &str = "already_submitted";

/// Configuration for the HTTP backend client.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the backend, without trailing path.
    pub base_url: String,
    /// Transport timeout per request.
    pub timeout: Duration,
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// REST client for the SYD backend.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    base_url: Url,
    client: Client,
}

impl HttpBackendClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// `Network` when the base URL does not parse or the TLS backend cannot
    /// be initialised.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| BackendError::Network(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Network(format!(
                "Invalid base URL: {}",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Builds an endpoint URL; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn map_transport_error(err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }

    /// Turns non-success statuses into errors.
    async fn check_status(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            404 => Err(BackendError::NotFound(url)),
            code => Err(BackendError::Status {
                status: code,
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            }),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Self::map_transport_error)?;
        Self::decode(response).await
    }

    async fn post(&self, url: Url, body: &(impl Serialize + Sync)) -> Result<Response, BackendError> {
        tracing::debug!(url = %url, "POST");
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Self::map_transport_error)
    }

    /// Reads a `{success, error?, message?}` acknowledgement, falling back
    /// to the status when the body is not one.
    async fn read_ack(response: Response) -> Result<AckResponse, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(Self::map_transport_error)?;
        match serde_json::from_str::<AckResponse>(&body) {
            Ok(ack) => Ok(ack),
            Err(_) if !status.is_success() => Err(BackendError::Status {
                status: status.as_u16(),
                message: body,
            }),
            Err(e) => Err(BackendError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl RiskBackend for HttpBackendClient {
    async fn fetch_events(&self, category_key: &str) -> Result<Vec<RiskEvent>, BackendError> {
        let response: EventsResponse = self
            .get_json(self.endpoint(&["events", category_key]), &[])
            .await?;
        Ok(response.events.into_iter().map(RiskEvent::from).collect())
    }

    async fn fetch_event_details(&self, event_code: &str) -> Result<EventDetails, BackendError> {
        self.get_json(self.endpoint(&["description", event_code]), &[])
            .await
    }

    async fn fetch_assessment_fields(&self) -> Result<Vec<AssessmentField>, BackendError> {
        let response: FieldsResponse = self
            .get_json(self.endpoint(&["risk-assessment-fields"]), &[])
            .await?;
        Ok(response
            .fields
            .into_iter()
            .filter_map(FieldDto::into_field)
            .collect())
    }

    async fn save_assessment(
        &self,
        submission: &AssessmentSubmission,
    ) -> Result<AssessmentOutcome, BackendError> {
        let response = self
            .post(self.endpoint(&["save-risk-assessment"]), submission)
            .await?;
        let saved: SaveResponse = Self::decode(response).await?;
        Ok(saved.into())
    }
}

#[async_trait]
impl AtecoDirectory for HttpBackendClient {
    async fn lookup(&self, code: &str) -> Result<AtecoLookup, BackendError> {
        let response: LookupResponse = self
            .get_json(
                self.endpoint(&["ateco", "lookup"]),
                &[("code", code), ("prefer", "2025")],
            )
            .await?;
        Ok(response.into())
    }

    async fn batch_lookup(&self, codes: &[String]) -> Result<Vec<Option<AtecoItem>>, BackendError> {
        let response = self
            .post(self.endpoint(&["batch"]), &BatchRequest { codes })
            .await?;
        let batch: BatchResponse = Self::decode(response).await?;

        let mut results = batch.results.into_iter();
        Ok(codes
            .iter()
            .map(|_| results.next().and_then(LookupResponse::first_item))
            .collect())
    }
}

#[async_trait]
impl EventTracker for HttpBackendClient {
    async fn track(&self, event: &TrackedEvent) -> Result<(), BackendError> {
        let response = self.post(self.endpoint(&["api", "events"]), event).await?;
        Self::check_status(response).await.map(|_| ())
    }
}

#[async_trait]
impl FeedbackSink for HttpBackendClient {
    async fn submit_feedback(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<FeedbackReceipt, BackendError> {
        let response = self
            .post(self.endpoint(&["api", "feedback"]), submission)
            .await?;
        let ack = Self::read_ack(response).await?;

        if ack.success {
            return Ok(FeedbackReceipt::Accepted);
        }
        if ack.error.as_deref() == Some(ALREADY_SUBMITTED) {
            return Ok(FeedbackReceipt::AlreadySubmitted {
                message: ack
                    .message
                    .unwrap_or_else(|| "Feedback già inviato".to_string()),
            });
        }
        Err(BackendError::Rejected(
            ack.message
                .or(ack.error)
                .unwrap_or_else(|| "Errore durante invio".to_string()),
        ))
    }
}

#[async_trait]
impl ReportSender for HttpBackendClient {
    async fn send_prereport(&self, report: &PreReport) -> Result<(), BackendError> {
        let response = self
            .post(self.endpoint(&["api", "send-prereport-pdf"]), report)
            .await?;
        let ack = Self::read_ack(response).await?;
        if ack.success {
            Ok(())
        } else {
            Err(BackendError::Rejected(
                ack.error
                    .or(ack.message)
                    .unwrap_or_else(|| "Errore durante l'invio".to_string()),
            ))
        }
    }
}
