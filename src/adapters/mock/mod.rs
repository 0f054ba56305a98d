//! Mock backend for tests and offline runs.
//!
//! Implements every backend port from in-memory tables.
//!
//! # Features
//!
//! - Configurable catalog, questionnaire and ATECO directory
//! - Simulated delays for timeout and concurrency testing
//! - Error injection per operation, consumed in order
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let backend = MockBackend::with_sample_catalog()
//!     .with_failure(MockOperation::FetchEvents, BackendError::Timeout);
//!
//! assert!(backend.fetch_events("Damage_Danni").await.is_err());
//! assert!(backend.fetch_events("Damage_Danni").await.is_ok());
//! ```

mod catalog;

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::ateco::{AtecoItem, AtecoLookup};
use crate::domain::feedback::{FeedbackReceipt, FeedbackSubmission};
use crate::domain::risk::{AssessmentField, AssessmentOutcome, EventDetails, RiskEvent};
use crate::ports::{
    AssessmentSubmission, AtecoDirectory, AtecoEnricher, BackendError, EventTracker,
    FeedbackSink, PreReport, ReportSender, RiskBackend, TrackedEvent,
};

/// Backend operations, for error injection and call tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    FetchEvents,
    FetchEventDetails,
    FetchAssessmentFields,
    SaveAssessment,
    AtecoLookup,
    AtecoBatchLookup,
    Enrich,
    Track,
    SubmitFeedback,
    SendPrereport,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub operation: MockOperation,
    pub argument: String,
}

#[derive(Debug, Default)]
struct MockData {
    events: HashMap<String, Vec<RiskEvent>>,
    details: HashMap<String, EventDetails>,
    fields: Vec<AssessmentField>,
    outcome: Option<AssessmentOutcome>,
    ateco: HashMap<String, AtecoLookup>,
    enrichment: Option<String>,
    feedback_receipts: VecDeque<FeedbackReceipt>,
    failures: HashMap<MockOperation, VecDeque<BackendError>>,
    calls: Vec<MockCall>,
    saved: Vec<AssessmentSubmission>,
    tracked: Vec<TrackedEvent>,
    feedback: Vec<FeedbackSubmission>,
    prereports: Vec<PreReport>,
    batch_sizes: Vec<usize>,
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    data: Arc<Mutex<MockData>>,
    delay: Duration,
}

impl MockBackend {
    /// Creates an empty backend: no events, no fields, every ATECO code
    /// missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with a small catalog for every category and the
    /// eight-question questionnaire.
    pub fn with_sample_catalog() -> Self {
        let backend = Self::new().with_fields(catalog::sample_fields());
        for (key, events) in catalog::sample_events() {
            backend.data().events.insert(key.to_string(), events);
        }
        backend
    }

    fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_events(self, category_key: &str, events: Vec<RiskEvent>) -> Self {
        self.data().events.insert(category_key.to_string(), events);
        self
    }

    pub fn with_event_details(self, code: &str, details: EventDetails) -> Self {
        self.data().details.insert(code.to_string(), details);
        self
    }

    pub fn with_fields(self, fields: Vec<AssessmentField>) -> Self {
        self.data().fields = fields;
        self
    }

    pub fn with_outcome(self, outcome: AssessmentOutcome) -> Self {
        self.data().outcome = Some(outcome);
        self
    }

    pub fn with_ateco(self, code: &str, lookup: AtecoLookup) -> Self {
        self.data().ateco.insert(code.to_string(), lookup);
        self
    }

    /// Raw enrichment text returned for every code.
    pub fn with_enrichment(self, text: impl Into<String>) -> Self {
        self.data().enrichment = Some(text.into());
        self
    }

    /// Queues the receipt of the next feedback submission.
    pub fn with_feedback_receipt(self, receipt: FeedbackReceipt) -> Self {
        self.data().feedback_receipts.push_back(receipt);
        self
    }

    /// Queues an error for the next call of `operation`.
    pub fn with_failure(self, operation: MockOperation, error: BackendError) -> Self {
        self.fail_next(operation, error);
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues an error on an already shared backend.
    pub fn fail_next(&self, operation: MockOperation, error: BackendError) {
        self.data()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.data().calls.clone()
    }

    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.data()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn saved_assessments(&self) -> Vec<AssessmentSubmission> {
        self.data().saved.clone()
    }

    pub fn tracked_events(&self) -> Vec<TrackedEvent> {
        self.data().tracked.clone()
    }

    pub fn submitted_feedback(&self) -> Vec<FeedbackSubmission> {
        self.data().feedback.clone()
    }

    pub fn sent_prereports(&self) -> Vec<PreReport> {
        self.data().prereports.clone()
    }

    /// Sizes of the batch lookup calls, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.data().batch_sizes.clone()
    }

    /// Records the call, waits the configured delay and pops an injected
    /// failure if one is queued.
    async fn enter(&self, operation: MockOperation, argument: &str) -> Result<(), BackendError> {
        self.data().calls.push(MockCall {
            operation,
            argument: argument.to_string(),
        });
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        match self
            .data()
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RiskBackend for MockBackend {
    async fn fetch_events(&self, category_key: &str) -> Result<Vec<RiskEvent>, BackendError> {
        self.enter(MockOperation::FetchEvents, category_key).await?;
        self.data()
            .events
            .get(category_key)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("events/{}", category_key)))
    }

    async fn fetch_event_details(&self, event_code: &str) -> Result<EventDetails, BackendError> {
        self.enter(MockOperation::FetchEventDetails, event_code).await?;
        Ok(self.data().details.get(event_code).cloned().unwrap_or_default())
    }

    async fn fetch_assessment_fields(&self) -> Result<Vec<AssessmentField>, BackendError> {
        self.enter(MockOperation::FetchAssessmentFields, "").await?;
        Ok(self.data().fields.clone())
    }

    async fn save_assessment(
        &self,
        submission: &AssessmentSubmission,
    ) -> Result<AssessmentOutcome, BackendError> {
        self.enter(MockOperation::SaveAssessment, &submission.event_code)
            .await?;
        let mut data = self.data();
        data.saved.push(submission.clone());
        Ok(data.outcome.clone().unwrap_or_else(|| AssessmentOutcome {
            risk_score: 50,
            analysis: "Rischio medio".to_string(),
        }))
    }
}

#[async_trait]
impl AtecoDirectory for MockBackend {
    async fn lookup(&self, code: &str) -> Result<AtecoLookup, BackendError> {
        self.enter(MockOperation::AtecoLookup, code).await?;
        Ok(self
            .data()
            .ateco
            .get(code)
            .cloned()
            .unwrap_or(AtecoLookup::Missing))
    }

    async fn batch_lookup(&self, codes: &[String]) -> Result<Vec<Option<AtecoItem>>, BackendError> {
        self.enter(MockOperation::AtecoBatchLookup, &codes.join(","))
            .await?;
        let mut data = self.data();
        data.batch_sizes.push(codes.len());
        Ok(codes
            .iter()
            .map(|code| match data.ateco.get(code) {
                Some(AtecoLookup::Found(item)) => Some(item.clone()),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl AtecoEnricher for MockBackend {
    async fn enrich(
        &self,
        code: &str,
        _item: Option<&AtecoItem>,
    ) -> Result<Option<String>, BackendError> {
        self.enter(MockOperation::Enrich, code).await?;
        Ok(self.data().enrichment.clone())
    }
}

#[async_trait]
impl EventTracker for MockBackend {
    async fn track(&self, event: &TrackedEvent) -> Result<(), BackendError> {
        self.enter(MockOperation::Track, &event.event_type.to_string())
            .await?;
        self.data().tracked.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl FeedbackSink for MockBackend {
    async fn submit_feedback(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<FeedbackReceipt, BackendError> {
        self.enter(MockOperation::SubmitFeedback, &submission.session_id)
            .await?;
        let mut data = self.data();
        data.feedback.push(submission.clone());
        Ok(data
            .feedback_receipts
            .pop_front()
            .unwrap_or(FeedbackReceipt::Accepted))
    }
}

#[async_trait]
impl ReportSender for MockBackend {
    async fn send_prereport(&self, report: &PreReport) -> Result<(), BackendError> {
        self.enter(MockOperation::SendPrereport, "").await?;
        self.data().prereports.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let backend = MockBackend::with_sample_catalog()
            .with_failure(MockOperation::FetchEvents, BackendError::Timeout);

        assert_eq!(
            backend.fetch_events("Damage_Danni").await,
            Err(BackendError::Timeout)
        );
        assert!(backend.fetch_events("Damage_Danni").await.is_ok());
        assert_eq!(backend.call_count(MockOperation::FetchEvents), 2);
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.fetch_events("Nope").await,
            Err(BackendError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn sample_catalog_covers_every_category() {
        let backend = MockBackend::with_sample_catalog();
        for category in crate::domain::risk::catalog() {
            let events = backend.fetch_events(category.backend_key).await.unwrap();
            assert!(!events.is_empty(), "{}", category.id);
        }
        assert_eq!(backend.fetch_assessment_fields().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn batch_lookup_aligns_results() {
        let backend = MockBackend::new().with_ateco("62.01", AtecoLookup::Found(AtecoItem::default()));
        let results = backend
            .batch_lookup(&["00.00".to_string(), "62.01".to_string()])
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_none());
        assert!(results[1].is_some());
        assert_eq!(backend.batch_sizes(), vec![2]);
    }
}
