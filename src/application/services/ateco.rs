//! ATECO lookups.
//!
//! A single lookup builds the ATECO card from the directory record and the
//! enrichment text, then stores the derived metadata in the session. A
//! batch lookup resolves many codes in chunks and posts a summary.

use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::RiskFlowError;
use crate::application::guard::OperationGuard;
use crate::domain::ateco::{
    batch_summary, clean_codes, parse_code_list, suggestions_message, AtecoEnrichment, AtecoItem,
    AtecoLookup, AtecoReport, BatchEntry, MAX_BATCH_SIZE,
};
use crate::domain::chat::{ChatAction, ChatMessage, ChatStore, MessagePayload};
use crate::domain::session::SessionStore;
use crate::ports::{AtecoDirectory, AtecoEnricher, Notifier};

use super::bounded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtecoSettings {
    pub operation_timeout: Duration,
    /// Codes per batch call, at most 50.
    pub batch_size: usize,
}

impl Default for AtecoSettings {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(20),
            batch_size: MAX_BATCH_SIZE,
        }
    }
}

pub struct AtecoService {
    directory: Arc<dyn AtecoDirectory>,
    enricher: Arc<dyn AtecoEnricher>,
    chat: Arc<ChatStore>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    settings: AtecoSettings,
    guard: OperationGuard,
}

impl AtecoService {
    pub fn new(
        directory: Arc<dyn AtecoDirectory>,
        enricher: Arc<dyn AtecoEnricher>,
        chat: Arc<ChatStore>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            enricher,
            chat,
            session,
            notifier,
            settings: AtecoSettings::default(),
            guard: OperationGuard::new(),
        }
    }

    pub fn with_settings(mut self, settings: AtecoSettings) -> Self {
        self.settings = AtecoSettings {
            batch_size: settings.batch_size.clamp(1, MAX_BATCH_SIZE),
            ..settings
        };
        self
    }

    /// Looks up a code and posts the ATECO card.
    ///
    /// A code the directory does not know still yields a card built from
    /// the input and the fallback content; only a miss with suggestions is
    /// reported as `NotFound`, after listing them in the chat.
    pub async fn lookup(&self, code: &str) -> Result<AtecoReport, RiskFlowError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(RiskFlowError::ValidationFailure(
                "ATECO code cannot be empty".to_string(),
            ));
        }
        let _permit = self.guard.try_acquire()?;

        self.set_typing(true);
        let result = self.lookup_inner(code).await;
        self.set_typing(false);

        if let Err(err) = &result {
            if !matches!(err, RiskFlowError::NotFound(_)) {
                tracing::warn!(code, error = %err, "ATECO lookup failed");
                self.report_failure(&format!(
                    "❌ Errore durante la ricerca del codice ATECO {}. Riprova.",
                    code
                ));
            }
        }
        result
    }

    async fn lookup_inner(&self, code: &str) -> Result<AtecoReport, RiskFlowError> {
        let lookup = bounded(
            self.settings.operation_timeout,
            "ateco_lookup",
            self.directory.lookup(code),
        )
        .await?;

        let item = match lookup {
            AtecoLookup::Found(item) => Some(item),
            AtecoLookup::Missing => {
                tracing::info!(code, "ATECO code not in directory, using fallback content");
                None
            }
            AtecoLookup::Suggestions(suggestions) => {
                tracing::info!(code, suggestions = suggestions.len(), "ATECO code not found");
                self.post(ChatMessage::agent_text(suggestions_message(code, &suggestions)));
                self.notifier
                    .error(&format!("Codice ATECO {} non trovato", code));
                return Err(RiskFlowError::NotFound(format!("ATECO code '{}'", code)));
            }
        };

        let enrichment = self.enrich(code, item.as_ref()).await;
        let report = AtecoReport::assemble(code, item.as_ref(), enrichment.as_ref());
        self.session
            .update_meta(report.session_update(enrichment.as_ref()));

        self.post(ChatMessage::agent(MessagePayload::AtecoResponse {
            report: report.clone(),
        }));
        self.notifier.success(&report.headline());
        tracing::info!(
            code,
            ateco_2025 = %report.lookup.codice_2025,
            normative = report.normative.len(),
            enriched = enrichment.is_some(),
            "ATECO lookup completed"
        );
        Ok(report)
    }

    /// Enrichment never fails the lookup: errors and unparseable text fall
    /// back to the default content.
    async fn enrich(&self, code: &str, item: Option<&AtecoItem>) -> Option<AtecoEnrichment> {
        let raw = match bounded(
            self.settings.operation_timeout,
            "ateco_enrich",
            self.enricher.enrich(code, item),
        )
        .await
        {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(code, error = %e, "ATECO enrichment failed, using fallback");
                return None;
            }
        };

        let parsed = AtecoEnrichment::from_raw(&raw);
        if parsed.is_none() {
            tracing::warn!(code, "ATECO enrichment is not valid JSON, using fallback");
        }
        parsed
    }

    /// Resolves every code, `batch_size` codes per call, and posts a
    /// summary. Results keep the order of `codes`.
    pub async fn batch_lookup<S: AsRef<str>>(
        &self,
        codes: &[S],
    ) -> Result<Vec<BatchEntry>, RiskFlowError> {
        let codes = clean_codes(codes);
        if codes.is_empty() {
            return Err(RiskFlowError::ValidationFailure(
                "no ATECO codes to process".to_string(),
            ));
        }
        let _permit = self.guard.try_acquire()?;

        self.set_typing(true);
        let result = self.batch_inner(&codes).await;
        self.set_typing(false);

        match &result {
            Ok(entries) => {
                self.post(ChatMessage::agent_text(batch_summary(entries)));
                let found = entries.iter().filter(|e| e.is_found()).count();
                self.notifier.success(&format!(
                    "Batch completato: {}/{} codici trovati",
                    found,
                    entries.len()
                ));
                tracing::info!(total = entries.len(), found, "ATECO batch completed");
            }
            Err(err) => {
                tracing::warn!(error = %err, "ATECO batch failed");
                self.report_failure("❌ Errore durante l'elaborazione batch dei codici ATECO.");
            }
        }
        result
    }

    /// Batch lookup of a pasted or uploaded list.
    pub async fn import_codes(&self, text: &str) -> Result<Vec<BatchEntry>, RiskFlowError> {
        self.batch_lookup(&parse_code_list(text)).await
    }

    async fn batch_inner(&self, codes: &[String]) -> Result<Vec<BatchEntry>, RiskFlowError> {
        let mut entries = Vec::with_capacity(codes.len());
        for (index, chunk) in codes.chunks(self.settings.batch_size).enumerate() {
            tracing::debug!(chunk = index, size = chunk.len(), "ATECO batch chunk");
            let items = bounded(
                self.settings.operation_timeout,
                "ateco_batch",
                self.directory.batch_lookup(chunk),
            )
            .await?;

            let mut items = items.into_iter();
            entries.extend(chunk.iter().map(|code| BatchEntry {
                code: code.clone(),
                item: items.next().flatten(),
            }));
        }
        Ok(entries)
    }

    fn post(&self, message: ChatMessage) {
        if let Err(e) = self.chat.dispatch(ChatAction::AddMessage(message)) {
            tracing::error!(error = %e, "Failed to post ATECO message");
        }
    }

    fn report_failure(&self, text: &str) {
        self.post(ChatMessage::error(text));
        self.notifier.error(text);
    }

    fn set_typing(&self, typing: bool) {
        if let Err(e) = self.chat.dispatch(ChatAction::SetTyping(typing)) {
            tracing::error!(error = %e, "Failed to update typing indicator");
        }
    }
}
